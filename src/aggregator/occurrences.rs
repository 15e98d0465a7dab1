//! Function Occurrence Builder (§4.3): second pass over a host's
//! completed per-task time series, sharded by task-id across worker
//! threads.

use crate::parser::{extract_symbols, TaskId};
use crate::store::{FuncOccurrence, TaskTimeSeries};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// function-symbol -> task-id -> occurrence, for one host.
pub type HostOccurrences = HashMap<String, HashMap<TaskId, FuncOccurrence>>;

/// Build the per-host function occurrence index. Task-ids are chunked
/// (`chunk_size = ceil(total / workers)`) and each chunk's symbols are
/// re-derived from its persisted (already-normalized) stacks rather than
/// carried through storage (§4.3).
pub fn build_occurrences(host: &str, series: &HashMap<TaskId, TaskTimeSeries>, workers: usize) -> HostOccurrences {
    let task_ids: Vec<TaskId> = series.keys().copied().collect();
    if task_ids.is_empty() {
        return HashMap::new();
    }

    let workers = workers.max(1);
    let chunk_size = task_ids.len().div_ceil(workers).max(1);
    let chunks: Vec<&[TaskId]> = task_ids.chunks(chunk_size).collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .expect("failed to build occurrence worker pool");

    let (result_tx, result_rx) = crossbeam_channel::bounded::<HostOccurrences>(chunks.len().max(1));

    std::thread::scope(|scope| {
        scope.spawn(move || {
            pool.install(|| {
                chunks.par_iter().for_each_with(result_tx, |tx, chunk| {
                    let local = build_local_map(host, chunk, series);
                    let _ = tx.send(local);
                });
            });
        });

        merge_local_maps(result_rx)
    })
}

fn build_local_map(host: &str, chunk: &[TaskId], series: &HashMap<TaskId, TaskTimeSeries>) -> HostOccurrences {
    let mut local: HostOccurrences = HashMap::new();

    for &task_id in chunk {
        let Some(ts) = series.get(&task_id) else {
            continue;
        };
        let Some(first) = ts.entries.first() else {
            continue;
        };
        let last = ts.entries.last().unwrap_or(first);

        let mut symbols: BTreeSet<String> = BTreeSet::new();
        for entry in &ts.entries {
            symbols.extend(extract_symbols(&entry.stack));
        }

        for symbol in symbols {
            local.entry(symbol).or_default().insert(
                task_id,
                FuncOccurrence {
                    host: host.to_string(),
                    task_id,
                    first_seen: first.timestamp,
                    last_seen: last.timestamp,
                },
            );
        }
    }

    local
}

/// Merge worker-local maps. Last write wins if the same (symbol, task-id)
/// is produced twice, which should not happen since task-ids are
/// partitioned disjointly across workers (§4.3).
fn merge_local_maps(result_rx: crossbeam_channel::Receiver<HostOccurrences>) -> HostOccurrences {
    let mut merged: HostOccurrences = HashMap::new();
    for local in result_rx.iter() {
        for (symbol, occurrences) in local {
            merged.entry(symbol).or_default().extend(occurrences);
        }
    }
    merged
}
