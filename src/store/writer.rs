//! `StoreWriter` — owns the on-disk `sled` tree for one rebuild (§4.4).

use super::{codec, keys, ChildrenList, FuncIndex, FuncOccurrence, SnapshotCounts, TaskTimeSeries};
use crate::utils::config::STORE_BATCH_SIZE;
use crate::utils::error::StoreError;
use std::path::{Path, PathBuf};

/// Owns the store handle for the lifetime of one rebuild. Bulk record
/// kinds (`g:`, `c:`, `f:`) are staged into a `sled::Batch` and flushed in
/// groups of [`STORE_BATCH_SIZE`]; durable record kinds (`s:`, `m:`) are
/// written and flushed immediately.
pub struct StoreWriter {
    db: sled::Db,
    #[allow(dead_code)]
    path: PathBuf,
    batch: sled::Batch,
    batch_len: usize,
}

impl StoreWriter {
    /// Open a fresh store at `path`, destroying any prior state there
    /// (spec §3 lifecycle: "a rebuild begins by destroying any prior
    /// state at the store path").
    pub fn open_fresh(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            std::fs::remove_dir_all(path).map_err(StoreError::Io)?;
        }
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(path.to_path_buf(), e))?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
            batch: sled::Batch::default(),
            batch_len: 0,
        })
    }

    fn stage_bulk(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), StoreError> {
        self.batch.insert(key, value);
        self.batch_len += 1;
        if self.batch_len >= STORE_BATCH_SIZE {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Apply and clear any pending batch, regardless of size.
    pub fn flush_batch(&mut self) -> Result<(), StoreError> {
        if self.batch_len == 0 {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.batch);
        self.db.apply_batch(batch)?;
        self.batch_len = 0;
        Ok(())
    }

    /// `g:<host>:<task-id>` — bulk policy.
    pub fn put_task_series(
        &mut self,
        host: &str,
        task_id: u64,
        series: &TaskTimeSeries,
    ) -> Result<(), StoreError> {
        let key = keys::task_series(host, task_id);
        let value = codec::encode_compressed(series)?;
        self.stage_bulk(key, value)
    }

    /// `c:<host>:<task-id>` — bulk policy.
    pub fn put_children(
        &mut self,
        host: &str,
        parent_id: u64,
        children: &ChildrenList,
    ) -> Result<(), StoreError> {
        let key = keys::children(host, parent_id);
        let value = codec::encode_compressed(children)?;
        self.stage_bulk(key, value)
    }

    /// `s:<host>` — durable policy.
    pub fn put_snapshot_counts(
        &mut self,
        host: &str,
        counts: &SnapshotCounts,
    ) -> Result<(), StoreError> {
        let key = keys::snapshot_counts(host);
        let value = codec::encode_compressed(counts)?;
        self.db.insert(key, value)?;
        self.db.flush()?;
        Ok(())
    }

    /// `f:<function-symbol>` — read existing value if present, append,
    /// write with bulk policy. Flushes any pending batch first so the
    /// read observes every merge issued so far, including ones still
    /// sitting in the batch from an earlier host (hosts are processed
    /// sequentially, so this keeps merges across hosts consistent).
    pub fn merge_func_index(
        &mut self,
        symbol: &str,
        new_occurrences: &[FuncOccurrence],
    ) -> Result<(), StoreError> {
        self.flush_batch()?;

        let key = keys::func_index(symbol);
        let mut index: FuncIndex = match self.db.get(&key)? {
            Some(existing) => codec::decode_compressed(&existing)?,
            None => FuncIndex::default(),
        };
        index.occurrences.extend(new_occurrences.iter().cloned());

        let value = codec::encode_compressed(&index)?;
        self.stage_bulk(key, value)
    }

    /// `m:hosts` / `m:funcs` — durable policy, called last.
    pub fn put_metadata(&mut self, hosts: &[String], func_names: &[String]) -> Result<(), StoreError> {
        self.flush_batch()?;

        let hosts_value = codec::encode_plain(&hosts.to_vec())?;

        let mut sorted_funcs = func_names.to_vec();
        sorted_funcs.sort();
        let funcs_value = codec::encode_plain(&sorted_funcs)?;

        self.db.insert(keys::HOSTS_KEY, hosts_value)?;
        self.db.insert(keys::FUNCS_KEY, funcs_value)?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StackEntry, StoreReader};

    #[test]
    fn put_and_read_back_task_series() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("store");
        let mut writer = StoreWriter::open_fresh(&db_path).unwrap();

        let series = TaskTimeSeries {
            entries: vec![StackEntry {
                timestamp: 1000,
                state: "running".to_string(),
                stack: "pkg.Do()".to_string(),
                parent_task_id: None,
            }],
        };
        writer.put_task_series("hostA", 7, &series).unwrap();
        writer.flush_batch().unwrap();
        drop(writer);

        let reader = StoreReader::open(&db_path).unwrap();
        let read_back = reader.get_task_series("hostA", 7).unwrap().unwrap();
        assert_eq!(read_back, series);
    }

    #[test]
    fn merge_func_index_accumulates_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("store");
        let mut writer = StoreWriter::open_fresh(&db_path).unwrap();

        let occ_a = FuncOccurrence {
            host: "hostA".to_string(),
            task_id: 1,
            first_seen: 1000,
            last_seen: 1000,
        };
        let occ_b = FuncOccurrence {
            host: "hostB".to_string(),
            task_id: 1,
            first_seen: 2000,
            last_seen: 2000,
        };

        writer.merge_func_index("pkg.Handle", &[occ_a.clone()]).unwrap();
        writer.merge_func_index("pkg.Handle", &[occ_b.clone()]).unwrap();
        writer.flush_batch().unwrap();
        drop(writer);

        let reader = StoreReader::open(&db_path).unwrap();
        let index = reader.get_func_index("pkg.Handle").unwrap().unwrap();
        assert_eq!(index.occurrences, vec![occ_a, occ_b]);
    }

    #[test]
    fn open_fresh_wipes_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("store");

        let mut first = StoreWriter::open_fresh(&db_path).unwrap();
        first
            .put_snapshot_counts(
                "hostA",
                &SnapshotCounts {
                    timestamps: vec![1000],
                    counts: vec![1],
                },
            )
            .unwrap();
        drop(first);

        let second = StoreWriter::open_fresh(&db_path).unwrap();
        drop(second);

        let reader = StoreReader::open(&db_path).unwrap();
        assert!(reader.get_snapshot_counts("hostA").unwrap().is_none());
    }
}
