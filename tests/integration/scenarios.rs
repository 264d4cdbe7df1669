//! End-to-end scenarios: build, mutate the live tree, diff.

use super::test_utils::{build_snapshot, changes, diff_pairs, load_index, test_filter, write_file};
use baseline::diff::DiffEngine;
use baseline::snapshot::SnapshotBuilder;
use baseline::tree::path;
use baseline::types::DiffKind;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::TempDir;

const BIG_SIZE: usize = 2_097_152;

fn big_contents() -> Vec<u8> {
    (0..BIG_SIZE).map(|i| (i % 251) as u8).collect()
}

/// Source with a 10 byte `a.txt` and a 2 MiB `big.bin`
fn scenario_a_source() -> TempDir {
    let source = TempDir::new().unwrap();
    write_file(source.path(), "a.txt", b"0123456789");
    write_file(source.path(), "big.bin", &big_contents());
    source
}

#[test]
fn test_small_file_copied_and_large_file_hashed() {
    let source = scenario_a_source();
    let storage = TempDir::new().unwrap();

    let report = build_snapshot(source.path(), storage.path());
    assert_eq!(report.copied, 1);
    assert_eq!(report.hashed, 1);
    assert!(report.failures.is_empty());

    assert_eq!(fs::read(storage.path().join("a.txt")).unwrap(), b"0123456789");
    assert!(!storage.path().join("big.bin").exists());

    let expected_hex = hex::encode(Sha256::digest(big_contents()));
    let sidecar = fs::read_to_string(storage.path().join("big.bin.hash")).unwrap();
    assert_eq!(sidecar, format!("HASH: {}\nSIZE: {}\n", expected_hex, BIG_SIZE));
}

#[test]
fn test_appended_large_file_and_deleted_small_file() {
    let source = scenario_a_source();
    let storage = TempDir::new().unwrap();
    build_snapshot(source.path(), storage.path());

    let mut big = OpenOptions::new()
        .append(true)
        .open(source.path().join("big.bin"))
        .unwrap();
    big.write_all(b"!").unwrap();
    drop(big);
    fs::remove_file(source.path().join("a.txt")).unwrap();

    let index = load_index(storage.path(), source.path());
    assert_eq!(
        diff_pairs(&index, source.path()),
        vec![
            (DiffKind::Modified, "big.bin".to_string()),
            (DiffKind::Removed, "a.txt".to_string()),
        ]
    );
}

#[test]
fn test_same_size_rewrite_of_large_file_is_modified() {
    let source = scenario_a_source();
    let storage = TempDir::new().unwrap();
    build_snapshot(source.path(), storage.path());

    let mut contents = big_contents();
    contents[BIG_SIZE / 2] ^= 0xff;
    write_file(source.path(), "big.bin", &contents);

    let index = load_index(storage.path(), source.path());
    assert_eq!(
        changes(&index, source.path()),
        vec![(DiffKind::Modified, "big.bin".to_string())]
    );
}

#[test]
fn test_malformed_sidecar_reports_modified_for_identical_file() {
    let source = scenario_a_source();
    let storage = TempDir::new().unwrap();
    build_snapshot(source.path(), storage.path());

    fs::write(
        storage.path().join("big.bin.hash"),
        format!("SIZE: {}\n", BIG_SIZE),
    )
    .unwrap();

    let index = load_index(storage.path(), source.path());
    let record = index.get("big.bin").unwrap();
    assert!(record.digest.is_none());

    assert_eq!(
        diff_pairs(&index, source.path()),
        vec![
            (DiffKind::Modified, "big.bin".to_string()),
            (DiffKind::Unchanged, "a.txt".to_string()),
        ]
    );
}

#[test]
fn test_overlong_path_never_walked() {
    let source = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let root = path::absolutize(source.path()).unwrap();

    let dir = root.join("d".repeat(120));
    let remaining = 300 - path::char_len(&dir) - 1;
    let long_file = dir.join("f".repeat(remaining));
    assert_eq!(path::char_len(&long_file), 300);
    fs::create_dir_all(&dir).unwrap();
    fs::write(&long_file, b"hidden").unwrap();
    write_file(source.path(), "visible.txt", b"seen");

    let report = SnapshotBuilder::new(root.clone(), storage.path().to_path_buf())
        .with_filter(test_filter())
        .build()
        .unwrap();
    assert_eq!(report.files_seen, 1);
    assert!(report.failures.is_empty());

    let index = load_index(storage.path(), source.path());
    assert_eq!(index.len(), 1);
    assert!(index.contains("visible.txt"));

    // Also absent from the live walk of a diff
    let (records, summary) = DiffEngine::new(&index, root)
        .with_filter(test_filter())
        .collect();
    assert_eq!(summary.unchanged, 1);
    assert!(records
        .iter()
        .all(|r| !r.path.contains(&"f".repeat(remaining))));
    assert_eq!(records.len(), 1);
}
