//! `index` command: runs a full rebuild against the store (§4.6).

use crate::rebuild::{self, RebuildStats};
use crate::utils::config::RebuildConfig;
use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Arguments for the `index` command.
#[derive(Debug, Clone)]
pub struct IndexArgs {
    pub input: PathBuf,
    pub db: PathBuf,
    pub workers: Option<usize>,
}

pub fn execute_index(args: IndexArgs) -> Result<RebuildStats> {
    let config = RebuildConfig::new(args.input, args.db, args.workers);

    info!(
        "starting rebuild: input={:?} db={:?} workers={}",
        config.input_root, config.db_path, config.workers
    );

    let stats = rebuild::run(&config)?;
    Ok(stats)
}
