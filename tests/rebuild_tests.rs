//! End-to-end rebuild scenarios, exercising the full parser → aggregator
//! → store pipeline against on-disk fixtures.

use std::fs;
use std::path::Path;
use taskdump_index::rebuild;
use taskdump_index::store::StoreReader;
use taskdump_index::utils::config::RebuildConfig;

fn write_dump(host_dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(host_dir).unwrap();
    fs::write(host_dir.join(name), contents).unwrap();
}

#[test]
fn pointer_normalization_round_trips_through_a_full_rebuild() {
    let input = tempfile::tempdir().unwrap();
    let db = tempfile::tempdir().unwrap();
    let host_dir = input.path().join("hostA");

    write_dump(
        &host_dir,
        "2024-01-01T00-00-00.dump",
        "task 7 [running]:\npkg.Do(0xc0001234)\n",
    );
    write_dump(
        &host_dir,
        "2024-01-01T00-01-00.dump",
        "task 7 [running]:\npkg.Do(0xc0009999)\n",
    );

    let config = RebuildConfig::new(input.path().to_path_buf(), db.path().to_path_buf(), Some(2));
    rebuild::run(&config).unwrap();

    let reader = StoreReader::open(db.path()).unwrap();
    let series = reader.get_task_series("hostA", 7).unwrap().unwrap();
    assert_eq!(series.entries.len(), 2);
    assert_eq!(series.entries[0].stack, series.entries[1].stack);
    assert_eq!(series.entries[0].stack, "pkg.Do(...)");
}

#[test]
fn rebuild_wipes_prior_state() {
    let db = tempfile::tempdir().unwrap();

    let first_input = tempfile::tempdir().unwrap();
    write_dump(
        &first_input.path().join("hostA"),
        "2024-01-01T00-00-00.dump",
        "task 1 [running]:\npkg.A()\n",
    );
    let first_config = RebuildConfig::new(
        first_input.path().to_path_buf(),
        db.path().to_path_buf(),
        Some(1),
    );
    rebuild::run(&first_config).unwrap();

    let second_input = tempfile::tempdir().unwrap();
    write_dump(
        &second_input.path().join("hostB"),
        "2024-01-01T00-00-00.dump",
        "task 1 [running]:\npkg.B()\n",
    );
    let second_config = RebuildConfig::new(
        second_input.path().to_path_buf(),
        db.path().to_path_buf(),
        Some(1),
    );
    rebuild::run(&second_config).unwrap();

    let reader = StoreReader::open(db.path()).unwrap();
    assert!(reader.get_task_series("hostA", 1).unwrap().is_none());
    assert!(reader.get_task_series("hostB", 1).unwrap().is_some());
    assert_eq!(reader.list_hosts().unwrap(), vec!["hostB".to_string()]);
}

#[test]
fn parallel_determinism_across_worker_counts() {
    let input = tempfile::tempdir().unwrap();
    let host_dir = input.path().join("hostA");
    for i in 0..12 {
        write_dump(
            &host_dir,
            &format!("2024-01-01T00-{i:02}-00.dump"),
            &format!("task {t} [running]:\npkg.Do()\n", t = i % 4),
        );
    }

    let db_one = tempfile::tempdir().unwrap();
    let config_one = RebuildConfig::new(input.path().to_path_buf(), db_one.path().to_path_buf(), Some(1));
    rebuild::run(&config_one).unwrap();

    let db_many = tempfile::tempdir().unwrap();
    let config_many = RebuildConfig::new(input.path().to_path_buf(), db_many.path().to_path_buf(), Some(8));
    rebuild::run(&config_many).unwrap();

    let reader_one = StoreReader::open(db_one.path()).unwrap();
    let reader_many = StoreReader::open(db_many.path()).unwrap();

    for task_id in 0..4u64 {
        let series_one = reader_one.get_task_series("hostA", task_id).unwrap().unwrap();
        let series_many = reader_many.get_task_series("hostA", task_id).unwrap().unwrap();
        assert_eq!(series_one, series_many);
    }

    let counts_one = reader_one.get_snapshot_counts("hostA").unwrap().unwrap();
    let counts_many = reader_many.get_snapshot_counts("hostA").unwrap().unwrap();
    assert_eq!(counts_one, counts_many);
}

#[test]
fn function_index_merges_across_hosts() {
    let input = tempfile::tempdir().unwrap();
    write_dump(
        &input.path().join("hostA"),
        "2024-01-01T00-00-00.dump",
        "task 1 [running]:\npkg.Handle()\n",
    );
    write_dump(
        &input.path().join("hostB"),
        "2024-01-01T00-00-00.dump",
        "task 1 [running]:\npkg.Handle()\n",
    );

    let db = tempfile::tempdir().unwrap();
    let config = RebuildConfig::new(input.path().to_path_buf(), db.path().to_path_buf(), Some(2));
    rebuild::run(&config).unwrap();

    let reader = StoreReader::open(db.path()).unwrap();
    let index = reader.get_func_index("pkg.Handle").unwrap().unwrap();
    let hosts: std::collections::HashSet<_> = index.occurrences.iter().map(|occ| occ.host.clone()).collect();
    assert_eq!(hosts.len(), 2);
    assert!(hosts.contains("hostA"));
    assert!(hosts.contains("hostB"));
}

#[test]
fn single_task_two_dumps_produces_expected_snapshot_counts() {
    let input = tempfile::tempdir().unwrap();
    write_dump(
        &input.path().join("hostA"),
        "2024-01-01T00-00-00.dump",
        "task 7 [running]:\npkg.Do()\n",
    );
    write_dump(
        &input.path().join("hostA"),
        "2024-01-01T00-01-00.dump",
        "task 7 [running]:\npkg.Do()\n",
    );

    let db = tempfile::tempdir().unwrap();
    let config = RebuildConfig::new(input.path().to_path_buf(), db.path().to_path_buf(), Some(2));
    rebuild::run(&config).unwrap();

    let reader = StoreReader::open(db.path()).unwrap();
    let counts = reader.get_snapshot_counts("hostA").unwrap().unwrap();
    assert_eq!(counts.timestamps.len(), 2);
    assert_eq!(counts.counts, vec![1, 1]);

    let children = reader.get_children("hostA", 0).unwrap();
    assert!(children.is_none());
}
