//! `StoreReader` — thin read-only accessors over a built store, used by
//! the `query` and `list-funcs` commands (§6: diagnostic use only, not on
//! the core data path).

use super::{codec, keys, ChildrenList, FuncIndex, SnapshotCounts, TaskTimeSeries};
use crate::utils::error::StoreError;
use std::path::Path;

pub struct StoreReader {
    db: sled::Db,
}

impl StoreReader {
    /// Opens the store read-only: `query`/`list-funcs` are diagnostic
    /// commands and must not be able to mutate the index (§4.7).
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .path(path)
            .read_only(true)
            .open()
            .map_err(|e| StoreError::OpenFailed(path.to_path_buf(), e))?;
        Ok(Self { db })
    }

    pub fn get_task_series(&self, host: &str, task_id: u64) -> Result<Option<TaskTimeSeries>, StoreError> {
        self.get_compressed(&keys::task_series(host, task_id))
    }

    pub fn get_children(&self, host: &str, parent_id: u64) -> Result<Option<ChildrenList>, StoreError> {
        self.get_compressed(&keys::children(host, parent_id))
    }

    pub fn get_snapshot_counts(&self, host: &str) -> Result<Option<SnapshotCounts>, StoreError> {
        self.get_compressed(&keys::snapshot_counts(host))
    }

    pub fn get_func_index(&self, symbol: &str) -> Result<Option<FuncIndex>, StoreError> {
        self.get_compressed(&keys::func_index(symbol))
    }

    pub fn list_hosts(&self) -> Result<Vec<String>, StoreError> {
        self.get_plain(keys::HOSTS_KEY)
    }

    pub fn list_funcs(&self) -> Result<Vec<String>, StoreError> {
        self.get_plain(keys::FUNCS_KEY)
    }

    fn get_compressed<T: serde::de::DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StoreError> {
        match self.db.get(key)? {
            Some(bytes) => Ok(Some(codec::decode_compressed(&bytes)?)),
            None => Ok(None),
        }
    }

    fn get_plain(&self, key: &[u8]) -> Result<Vec<String>, StoreError> {
        match self.db.get(key)? {
            Some(bytes) => codec::decode_plain(&bytes),
            None => Ok(Vec::new()),
        }
    }
}
