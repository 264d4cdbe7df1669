//! Configuration loading across file and environment layers

use super::test_utils::env_lock;
use baseline::config::ConfigLoader;
use baseline::types::DEFAULT_SIZE_THRESHOLD;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Points the global config lookup at an empty directory for the guard's lifetime
struct IsolatedEnv {
    _guard: std::sync::MutexGuard<'static, ()>,
    saved: Vec<(&'static str, Option<String>)>,
    home: TempDir,
}

impl IsolatedEnv {
    fn new() -> Self {
        let guard = env_lock();
        let home = TempDir::new().unwrap();
        let keys = [
            "HOME",
            "XDG_CONFIG_HOME",
            "BASELINE_ENV",
            "BASELINE_SCAN__SIZE_THRESHOLD",
            "BASELINE_SCAN__EXCLUDED_PATHS",
        ];
        let saved = keys.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        std::env::set_var("HOME", home.path());
        std::env::set_var("XDG_CONFIG_HOME", home.path().join(".config"));
        for key in &keys[2..] {
            std::env::remove_var(key);
        }
        Self {
            _guard: guard,
            saved,
            home,
        }
    }
}

impl Drop for IsolatedEnv {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[test]
fn test_defaults_without_any_file() {
    let _env = IsolatedEnv::new();
    let dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(dir.path()).unwrap();
    assert_eq!(config.scan.root, PathBuf::from("/"));
    assert_eq!(config.scan.size_threshold, DEFAULT_SIZE_THRESHOLD);
    assert!(config.scan.excluded_paths.contains(&PathBuf::from("/proc")));
    assert_eq!(config.storage.archive, PathBuf::from("baseline.tar.gz"));
}

#[test]
fn test_local_file_then_env_specific_file() {
    let _env = IsolatedEnv::new();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("baseline.toml"),
        "[scan]\nroot = \"/srv\"\nsize_threshold = 2048\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("baseline.ci.toml"),
        "[scan]\nsize_threshold = 4096\n",
    )
    .unwrap();
    std::env::set_var("BASELINE_ENV", "ci");

    let config = ConfigLoader::load(dir.path()).unwrap();
    assert_eq!(config.scan.root, PathBuf::from("/srv"));
    assert_eq!(config.scan.size_threshold, 4096);
}

#[test]
fn test_environment_overrides_files() {
    let _env = IsolatedEnv::new();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("baseline.toml"), "[scan]\nsize_threshold = 2048\n").unwrap();
    std::env::set_var("BASELINE_SCAN__SIZE_THRESHOLD", "8192");
    std::env::set_var("BASELINE_SCAN__EXCLUDED_PATHS", "/proc,/mnt/backup");

    let config = ConfigLoader::load(dir.path()).unwrap();
    assert_eq!(config.scan.size_threshold, 8192);
    assert_eq!(
        config.scan.excluded_paths,
        vec![PathBuf::from("/proc"), PathBuf::from("/mnt/backup")]
    );
}

#[test]
fn test_global_file_is_lowest_file_layer() {
    let env = IsolatedEnv::new();
    let global_dir = env.home.path().join(".config").join("baseline");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        "[scan]\nmax_path_len = 512\nsize_threshold = 1024\n",
    )
    .unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("baseline.toml"), "[scan]\nsize_threshold = 2048\n").unwrap();

    let config = ConfigLoader::load(dir.path()).unwrap();
    assert_eq!(config.scan.max_path_len, 512);
    assert_eq!(config.scan.size_threshold, 2048);
}

#[test]
fn test_invalid_values_rejected_with_every_problem() {
    let _env = IsolatedEnv::new();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        "[scan]\nsize_threshold = 0\nexcluded_paths = [\"relative/dir\"]\n[storage]\ncompression_level = 12\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_file(&path).unwrap_err().to_string();
    assert!(err.contains("Size threshold"));
    assert!(err.contains("relative/dir"));
    assert!(err.contains("Compression level"));
}
