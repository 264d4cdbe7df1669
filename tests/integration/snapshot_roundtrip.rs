//! Snapshot properties across build, archive and load

use super::test_utils::{build_snapshot, diff_pairs, load_index, test_filter, write_file};
use baseline::diff::DiffEngine;
use baseline::snapshot::{SnapshotArchive, SnapshotBuilder, SnapshotIndex, StagedSnapshot, TarGzArchive};
use baseline::types::{DiffKind, FileKind, FileRecord};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn sample_tree() -> TempDir {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "etc/hosts", b"127.0.0.1 localhost\n");
    write_file(source.path(), "etc/ssh/sshd_config", b"PermitRootLogin no\n");
    write_file(source.path(), "usr/bin/tool", &vec![0x7fu8; 4096]);
    write_file(source.path(), "empty", b"");
    write_file(source.path(), "var/lib/blob.bin", &vec![1u8; 300]);
    source
}

fn records_by_path(storage: &std::path::Path) -> BTreeMap<String, FileRecord> {
    SnapshotIndex::open(storage)
        .unwrap()
        .records()
        .map(|r| (r.relative_path.clone(), r.clone()))
        .collect()
}

#[test]
fn test_small_records_keep_build_time_size() {
    let source = sample_tree();
    let storage = TempDir::new().unwrap();
    build_snapshot(source.path(), storage.path());

    let index = load_index(storage.path(), source.path());
    assert_eq!(index.len(), 5);
    for (key, expected) in [
        ("etc/hosts", 20u64),
        ("etc/ssh/sshd_config", 19),
        ("usr/bin/tool", 4096),
        ("empty", 0),
    ] {
        let record = index.get(key).unwrap();
        assert_eq!(record.kind, FileKind::Small, "{}", key);
        assert_eq!(record.size, Some(expected), "{}", key);
    }
}

#[test]
fn test_large_records_unchanged_against_untouched_source() {
    let source = sample_tree();
    let storage = TempDir::new().unwrap();
    SnapshotBuilder::new(source.path().to_path_buf(), storage.path().to_path_buf())
        .with_filter(test_filter())
        .with_size_threshold(256)
        .build()
        .unwrap();

    let index = SnapshotIndex::load(storage.path(), source.path(), 255).unwrap();
    assert_eq!(index.get("usr/bin/tool").unwrap().kind, FileKind::Large);
    assert_eq!(index.get("var/lib/blob.bin").unwrap().kind, FileKind::Large);

    let (records, summary) = DiffEngine::new(&index, source.path().to_path_buf())
        .with_filter(test_filter())
        .with_size_threshold(256)
        .collect();
    assert_eq!(summary.unchanged, 5);
    assert!(records.iter().all(|r| r.kind == DiffKind::Unchanged));
}

#[test]
fn test_archive_round_trip_reproduces_index() {
    let source = sample_tree();
    let storage = TempDir::new().unwrap();
    SnapshotBuilder::new(source.path().to_path_buf(), storage.path().to_path_buf())
        .with_filter(test_filter())
        .with_size_threshold(256)
        .build()
        .unwrap();

    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("baseline.tar.gz");
    let archive = TarGzArchive::default();
    archive.pack(storage.path(), &archive_path).unwrap();

    let staged = StagedSnapshot::extract(&archive, &archive_path, Some(out.path())).unwrap();
    assert_eq!(records_by_path(storage.path()), records_by_path(staged.root()));
}

#[test]
fn test_repeated_diff_is_idempotent() {
    let source = sample_tree();
    let storage = TempDir::new().unwrap();
    build_snapshot(source.path(), storage.path());
    write_file(source.path(), "etc/hosts", b"10.0.0.1 intruder\n");
    write_file(source.path(), "new.txt", b"fresh");
    fs::remove_file(source.path().join("empty")).unwrap();

    let index = load_index(storage.path(), source.path());
    let first = diff_pairs(&index, source.path());
    let second = diff_pairs(&index, source.path());
    assert_eq!(first, second);
    assert!(first.contains(&(DiffKind::Modified, "etc/hosts".to_string())));
    assert!(first.contains(&(DiffKind::New, "new.txt".to_string())));
    assert!(first.contains(&(DiffKind::Removed, "empty".to_string())));
}

#[test]
fn test_paths_missing_from_snapshot_are_always_new() {
    let source = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    write_file(source.path(), "old.txt", b"old");
    build_snapshot(source.path(), storage.path());

    write_file(source.path(), "tiny.txt", b"x");
    write_file(source.path(), "huge.bin", &vec![9u8; 2 * 1024 * 1024]);
    write_file(source.path(), "deep/nested/file", b"nested");

    let index = load_index(storage.path(), source.path());
    assert_eq!(
        diff_pairs(&index, source.path()),
        vec![
            (DiffKind::New, "deep/nested/file".to_string()),
            (DiffKind::New, "huge.bin".to_string()),
            (DiffKind::New, "tiny.txt".to_string()),
            (DiffKind::Unchanged, "old.txt".to_string()),
        ]
    );
}

#[test]
fn test_missing_stored_copy_reports_modified() {
    let source = sample_tree();
    let storage = TempDir::new().unwrap();
    build_snapshot(source.path(), storage.path());

    let index = load_index(storage.path(), source.path());
    fs::remove_file(storage.path().join("etc").join("hosts")).unwrap();

    let pairs = diff_pairs(&index, source.path());
    assert!(pairs.contains(&(DiffKind::Modified, "etc/hosts".to_string())));
}

#[test]
fn test_storage_inside_source_is_not_snapshotted() {
    let source = sample_tree();
    let storage = source.path().join("snapshot");
    build_snapshot(source.path(), &storage);

    let index = load_index(&storage, source.path());
    assert_eq!(index.len(), 5);
    assert!(index.records().all(|r| !r.relative_path.starts_with("snapshot")));

    let pairs = diff_pairs(&index, source.path());
    assert!(pairs.iter().all(|(kind, _)| *kind == DiffKind::Unchanged));
}

#[test]
fn test_storage_nested_deeper_than_live_root_keeps_long_entries() {
    let source = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let storage = base.path().join("s".repeat(80));
    let live_root = baseline::tree::path::absolutize(source.path()).unwrap();

    // Fits the ceiling under the live root, not under the storage root
    let dir = "d".repeat(200 - baseline::tree::path::char_len(&live_root).min(150));
    let key = format!("{}/f.txt", dir);
    write_file(source.path(), &key, b"content");
    assert!(baseline::tree::path::char_len(&live_root.join(&key)) <= 255);
    assert!(baseline::tree::path::char_len(&storage.join(&key)) > 255);

    let report = build_snapshot(source.path(), &storage);
    assert_eq!(report.copied, 1);
    assert!(storage.join(&key).is_file());

    let index = load_index(&storage, source.path());
    assert!(index.contains(&key));
    let pairs = diff_pairs(&index, source.path());
    assert_eq!(pairs, vec![(DiffKind::Unchanged, key)]);
}

#[test]
fn test_archive_staging_prefix_does_not_drop_entries() {
    let source = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let live_root = baseline::tree::path::absolutize(source.path()).unwrap();
    let dir = "e".repeat(240 - baseline::tree::path::char_len(&live_root).min(200));
    let key = format!("{}/g.txt", dir);
    write_file(source.path(), &key, b"payload");
    build_snapshot(source.path(), storage.path());

    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("baseline.tar.gz");
    let archive = TarGzArchive::default();
    archive.pack(storage.path(), &archive_path).unwrap();
    let staged = StagedSnapshot::extract(&archive, &archive_path, Some(out.path())).unwrap();

    let index = load_index(staged.root(), source.path());
    assert!(index.contains(&key));
    assert!(diff_pairs(&index, source.path())
        .iter()
        .all(|(kind, _)| *kind == DiffKind::Unchanged));
}
