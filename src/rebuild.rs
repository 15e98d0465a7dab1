//! The rebuild driver: wipes prior state, walks host directories under
//! the input root, aggregates and indexes each host in turn, and
//! finishes with the global metadata records (§4.4, §4.6).

use crate::aggregator::{aggregate_host, build_occurrences};
use crate::store::StoreWriter;
use crate::utils::config::RebuildConfig;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

/// Summary of one rebuild run, used for the closing `info!` line and by
/// integration tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RebuildStats {
    pub hosts_indexed: usize,
    pub dumps_parsed: usize,
    pub tasks_indexed: usize,
    pub elapsed_millis: u128,
}

pub fn run(config: &RebuildConfig) -> Result<RebuildStats> {
    let started = Instant::now();

    let mut writer = StoreWriter::open_fresh(&config.db_path)
        .with_context(|| format!("failed to open store at {:?}", config.db_path))?;

    let host_dirs = enumerate_host_dirs(&config.input_root)
        .with_context(|| format!("failed to enumerate hosts under {:?}", config.input_root))?;

    let mut hosts = Vec::new();
    let mut all_funcs: BTreeSet<String> = BTreeSet::new();
    let mut stats = RebuildStats::default();

    for host_dir in host_dirs {
        let host_name = host_dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        log::info!("indexing host {host_name}");

        let aggregate = match aggregate_host(&host_dir, config.workers) {
            Ok(aggregate) => aggregate,
            Err(err) => {
                log::warn!("skipping host {host_name}: {err}");
                continue;
            }
        };

        stats.dumps_parsed += aggregate.snapshot_counts.timestamps.len();
        stats.tasks_indexed += aggregate.series.len();

        for (&task_id, series) in &aggregate.series {
            if let Err(err) = writer.put_task_series(&host_name, task_id, series) {
                log::warn!("failed to write series for {host_name}:{task_id}: {err}");
            }
        }

        for (&parent_id, children) in &aggregate.children {
            if let Err(err) = writer.put_children(&host_name, parent_id, children) {
                log::warn!("failed to write children for {host_name}:{parent_id}: {err}");
            }
        }

        if let Err(err) = writer.put_snapshot_counts(&host_name, &aggregate.snapshot_counts) {
            log::warn!("failed to write snapshot counts for {host_name}: {err}");
        }

        let occurrences = build_occurrences(&host_name, &aggregate.series, config.workers);
        for (symbol, by_task) in occurrences {
            all_funcs.insert(symbol.clone());
            let values: Vec<_> = by_task.into_values().collect();
            if let Err(err) = writer.merge_func_index(&symbol, &values) {
                log::warn!("failed to merge func index for {symbol}: {err}");
            }
        }

        hosts.push(host_name);
        stats.hosts_indexed += 1;
    }

    let func_names: Vec<String> = all_funcs.into_iter().collect();
    writer
        .put_metadata(&hosts, &func_names)
        .context("failed to write metadata records")?;

    stats.elapsed_millis = started.elapsed().as_millis();
    log::info!(
        "rebuild complete: {} hosts, {} dumps, {} tasks in {}ms",
        stats.hosts_indexed,
        stats.dumps_parsed,
        stats.tasks_indexed,
        stats.elapsed_millis
    );

    Ok(stats)
}

fn enumerate_host_dirs(input_root: &std::path::Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(input_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}
