//! Per-host orchestration: enumerate dump files, dispatch to the parser
//! worker pool, sort by timestamp, merge into time series, children
//! adjacency, and snapshot counts (§4.2).

use crate::parser::{self, entry_point_label, TaskDump, TaskId};
use crate::store::{ChildInfo, ChildrenList, SnapshotCounts, StackEntry, TaskTimeSeries};
use crate::utils::error::AggregateError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The three derived structures produced per host (§4.2).
#[derive(Debug, Default)]
pub struct HostAggregate {
    pub series: HashMap<TaskId, TaskTimeSeries>,
    pub children: HashMap<TaskId, ChildrenList>,
    pub snapshot_counts: SnapshotCounts,
}

/// Aggregate every dump file under `host_dir` using `workers` parser
/// threads.
pub fn aggregate_host(host_dir: &Path, workers: usize) -> Result<HostAggregate, AggregateError> {
    if !host_dir.is_dir() {
        return Err(AggregateError::MissingHostDir(host_dir.to_path_buf()));
    }

    let paths = enumerate_dump_files(host_dir);
    let mut dumps = parse_dumps_parallel(&paths, workers);
    dumps.sort_by_key(|dump| dump.timestamp);

    Ok(merge(dumps))
}

fn enumerate_dump_files(host_dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(host_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.contains(".dump"))
                .unwrap_or(false)
        })
        .collect()
}

/// A work-stealing producer drives the parser over `paths` via rayon's
/// `par_iter`, each result handed off through a bounded channel to a
/// collector running on the calling thread (§5: "no shared mutable state
/// between parser workers"). `workers` sizes a dedicated pool so the
/// configured worker count is honored rather than rayon's process-global
/// default.
fn parse_dumps_parallel(paths: &[PathBuf], workers: usize) -> Vec<TaskDump> {
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .expect("failed to build parser worker pool");

    let (result_tx, result_rx) = crossbeam_channel::bounded::<Option<TaskDump>>(paths.len().max(1));

    std::thread::scope(|scope| {
        scope.spawn(move || {
            pool.install(|| {
                paths.par_iter().for_each_with(result_tx, |tx, path| {
                    match parser::parse_dump_file(path) {
                        Ok(dump) => {
                            let _ = tx.send(Some(dump));
                        }
                        Err(err) => {
                            log::warn!("skipping dump file {path:?}: {err}");
                            let _ = tx.send(None);
                        }
                    }
                });
            });
        });

        result_rx.iter().flatten().collect()
    })
}

/// Sequential merge of timestamp-sorted dumps into the three derived
/// structures. Must run single-threaded in timestamp order (§5).
fn merge(dumps: Vec<TaskDump>) -> HostAggregate {
    let mut series: HashMap<TaskId, TaskTimeSeries> = HashMap::new();
    let mut first_symbols: HashMap<TaskId, Vec<String>> = HashMap::new();
    let mut timestamps = Vec::with_capacity(dumps.len());
    let mut counts = Vec::with_capacity(dumps.len());

    for dump in &dumps {
        timestamps.push(dump.timestamp);
        counts.push(dump.tasks.len());

        let mut task_ids: Vec<&TaskId> = dump.tasks.keys().collect();
        task_ids.sort_unstable();

        for &task_id in task_ids {
            let parsed = &dump.tasks[&task_id];

            first_symbols
                .entry(task_id)
                .or_insert_with(|| parsed.symbols.clone());

            series.entry(task_id).or_default().entries.push(StackEntry {
                timestamp: dump.timestamp,
                state: parsed.state.clone(),
                stack: parsed.normalized_stack.clone(),
                parent_task_id: parsed.parent_task_id.filter(|&id| id != 0),
            });
        }
    }

    let children = build_children(&series, &first_symbols);

    HostAggregate {
        series,
        children,
        snapshot_counts: SnapshotCounts { timestamps, counts },
    }
}

/// Scan each task's finalized series for the first entry with a
/// non-zero parent id, taking it as canonical (§4.2: "scanning beyond the
/// first entry is required — the parent link may not be emitted on every
/// dump").
fn build_children(
    series: &HashMap<TaskId, TaskTimeSeries>,
    first_symbols: &HashMap<TaskId, Vec<String>>,
) -> HashMap<TaskId, ChildrenList> {
    let mut children: HashMap<TaskId, ChildrenList> = HashMap::new();

    for (&task_id, ts) in series {
        let Some(parent_id) = ts.entries.iter().find_map(|entry| entry.parent_task_id) else {
            continue;
        };

        let Some(first) = ts.entries.first() else {
            continue;
        };
        let last = ts.entries.last().unwrap_or(first);

        let empty = Vec::new();
        let symbols = first_symbols.get(&task_id).unwrap_or(&empty);

        children.entry(parent_id).or_default().push(ChildInfo {
            child_task_id: task_id,
            entry_point_label: entry_point_label(symbols),
            first_seen: first.timestamp,
            last_seen: last.timestamp,
        });
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_dump(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn single_task_two_dumps_yields_two_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_dump(
            dir.path(),
            "2024-01-01T00-00-00.dump",
            "task 7 [running]:\npkg.Do()\n",
        );
        write_dump(
            dir.path(),
            "2024-01-01T00-01-00.dump",
            "task 7 [running]:\npkg.Do()\n",
        );

        let aggregate = aggregate_host(dir.path(), 2).unwrap();
        let series = aggregate.series.get(&7).unwrap();
        assert_eq!(series.entries.len(), 2);
        assert_eq!(series.entries[0].stack, series.entries[1].stack);
        assert_eq!(aggregate.snapshot_counts.timestamps.len(), 2);
        assert_eq!(aggregate.snapshot_counts.counts, vec![1, 1]);
    }

    #[test]
    fn parent_child_label_uses_outermost_two_frames() {
        let dir = tempfile::tempdir().unwrap();
        write_dump(
            dir.path(),
            "2024-01-01T00-00-00.dump",
            "task 1 [running]:\npkg.root()\n\ntask 2 [running]:\npkg.inner()\npkg.middle()\npkg.outer()\ncreated by pkg.outer in task 1\n",
        );

        let aggregate = aggregate_host(dir.path(), 1).unwrap();
        let kids = aggregate.children.get(&1).unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].child_task_id, 2);
        assert_eq!(kids[0].entry_point_label, "pkg.middle -> pkg.outer");
    }

    #[test]
    fn missing_host_dir_is_an_error() {
        let result = aggregate_host(Path::new("/no/such/host/dir"), 1);
        assert!(result.is_err());
    }
}
