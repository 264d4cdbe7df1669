//! Walker and path filter behaviour on real trees

use super::test_utils::write_file;
use baseline::tree::{PathFilter, SkipReason, Walker};
use baseline::types::DEFAULT_MAX_PATH_LEN;
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

fn walked(root: &Path, filter: &PathFilter) -> BTreeSet<String> {
    Walker::new(root.to_path_buf(), filter)
        .files()
        .map(|f| f.relative_path)
        .collect()
}

#[test]
fn test_excluded_root_hides_whole_subtree() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "keep/a.txt", b"a");
    write_file(root.path(), "cache/b.txt", b"b");
    write_file(root.path(), "cache/deeper/c.txt", b"c");
    write_file(root.path(), "cachefile", b"not under cache/");

    let filter = PathFilter::unrestricted(DEFAULT_MAX_PATH_LEN).with_excluded(root.path().join("cache"));
    let files = walked(root.path(), &filter);
    assert_eq!(
        files,
        ["cachefile", "keep/a.txt"].iter().map(|s| s.to_string()).collect()
    );
}

#[test]
fn test_non_canonical_excluded_root_still_matches() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "secret/key", b"k");
    write_file(root.path(), "public/readme", b"r");

    let messy = root.path().join("public").join("..").join(".").join("secret");
    let filter = PathFilter::unrestricted(DEFAULT_MAX_PATH_LEN).with_excluded(&messy);
    assert!(matches!(
        filter.decide(&root.path().join("secret").join("key")),
        Some(SkipReason::Excluded(_))
    ));

    let files = walked(root.path(), &filter);
    assert!(files.contains("public/readme"));
    assert!(!files.contains("secret/key"));
}

#[test]
fn test_default_exclusions_do_not_hide_requested_root() {
    // Temp dirs live under /tmp, itself a default exclusion
    let root = TempDir::new().unwrap();
    write_file(root.path(), "x.txt", b"x");
    let files = walked(root.path(), &PathFilter::default());
    assert!(files.contains("x.txt"));
}

#[cfg(unix)]
#[test]
fn test_symlinks_and_special_files_skipped() {
    let root = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    write_file(outside.path(), "elsewhere.txt", b"outside");
    write_file(root.path(), "real.txt", b"real");
    std::os::unix::fs::symlink(outside.path(), root.path().join("linked_dir")).unwrap();
    std::os::unix::fs::symlink(root.path().join("real.txt"), root.path().join("alias.txt")).unwrap();
    std::os::unix::fs::symlink(root.path().join("missing"), root.path().join("broken")).unwrap();

    let files = walked(root.path(), &PathFilter::unrestricted(DEFAULT_MAX_PATH_LEN));
    assert_eq!(files, ["real.txt"].iter().map(|s| s.to_string()).collect());
}

#[test]
fn test_short_ceiling_skips_directories_entirely() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "a.txt", b"a");
    write_file(root.path(), "long_directory_name/b.txt", b"b");

    let root_len = baseline::tree::path::char_len(&baseline::tree::path::absolutize(root.path()).unwrap());
    // Room for "/a.txt" but not for "/long_directory_name"
    let filter = PathFilter::unrestricted(root_len + 8);
    let files = walked(root.path(), &filter);
    assert_eq!(files, ["a.txt"].iter().map(|s| s.to_string()).collect());
}
