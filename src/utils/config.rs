//! Configuration and constants for the indexer.

use std::path::PathBuf;

/// Number of records per bulk write batch (§4.4).
pub const STORE_BATCH_SIZE: usize = 1000;

/// Expected dump filename pattern, for doc purposes:
/// `<YYYY-MM-DDTHH-MM-SS>.dump.<compression-suffix>`.
pub const DUMP_FILENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Configuration for a single rebuild run, assembled from CLI arguments.
#[derive(Debug, Clone)]
pub struct RebuildConfig {
    /// Root directory containing one subdirectory per monitored host.
    pub input_root: PathBuf,

    /// Path to the ordered key-value store to (re)create.
    pub db_path: PathBuf,

    /// Number of worker threads used for both the dump-parsing pool and
    /// the function-occurrence shard pass. Defaults to the number of
    /// available CPU cores when not set explicitly on the CLI.
    pub workers: usize,
}

impl RebuildConfig {
    pub fn new(input_root: PathBuf, db_path: PathBuf, workers: Option<usize>) -> Self {
        let workers = workers.unwrap_or_else(default_worker_count);
        Self {
            input_root,
            db_path,
            workers,
        }
    }
}

/// Default worker count: number of available CPU cores, minimum 1.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
