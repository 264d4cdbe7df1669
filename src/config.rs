//! Configuration System
//!
//! Layered configuration for the scan target, snapshot storage and logging.
//! Sources merge in order: built-in defaults, the global config file, local
//! config files, then `BASELINE_*` environment variables. CLI flags are applied
//! on top by the binary.

use crate::logging::LoggingConfig;
use crate::tree::filter::{PathFilter, SYSTEM_EXCLUDED_PATHS};
use crate::types::{DEFAULT_MAX_PATH_LEN, DEFAULT_SIZE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// What to walk and how to classify it
    #[serde(default)]
    pub scan: ScanConfig,

    /// Where snapshots are written and read
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scan settings shared by build and compare
///
/// One value feeds both phases, so the size threshold cannot drift between
/// building a snapshot and diffing against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root of the tree to snapshot and compare
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Files strictly larger than this many bytes are stored as digests
    #[serde(default = "default_size_threshold")]
    pub size_threshold: u64,

    /// Absolute paths longer than this many characters are never walked
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,

    /// Absolute roots excluded from every walk, together with their descendants
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<PathBuf>,
}

fn default_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_size_threshold() -> u64 {
    DEFAULT_SIZE_THRESHOLD
}

fn default_max_path_len() -> usize {
    DEFAULT_MAX_PATH_LEN
}

fn default_excluded_paths() -> Vec<PathBuf> {
    SYSTEM_EXCLUDED_PATHS.iter().map(PathBuf::from).collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            size_threshold: default_size_threshold(),
            max_path_len: default_max_path_len(),
            excluded_paths: default_excluded_paths(),
        }
    }
}

impl ScanConfig {
    /// Exclusion filter described by this configuration
    pub fn path_filter(&self) -> PathFilter {
        PathFilter::new(self.excluded_paths.iter().cloned(), self.max_path_len)
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.root.as_os_str().is_empty() {
            errors.push("Root cannot be empty".to_string());
        }
        if self.size_threshold == 0 {
            errors.push("Size threshold must be greater than zero".to_string());
        }
        if self.max_path_len == 0 {
            errors.push("Path length ceiling must be greater than zero".to_string());
        }
        for excluded in &self.excluded_paths {
            if !excluded.is_absolute() {
                errors.push(format!("Excluded path {} is not absolute", excluded.display()));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Snapshot storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the snapshot tree is built into
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Archive the snapshot directory is packed into
    #[serde(default = "default_archive")]
    pub archive: PathBuf,

    /// Keep the uncompressed snapshot directory after packing
    #[serde(default)]
    pub keep_snapshot_dir: bool,

    /// Gzip level, 0-9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Parent directory for extraction staging (system temp dir when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./baseline")
}

fn default_archive() -> PathBuf {
    PathBuf::from("baseline.tar.gz")
}

fn default_compression_level() -> u32 {
    6
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            archive: default_archive(),
            keep_snapshot_dir: false,
            compression_level: default_compression_level(),
            staging_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.snapshot_dir.as_os_str().is_empty() {
            errors.push("Snapshot directory cannot be empty".to_string());
        }
        if self.archive.as_os_str().is_empty() {
            errors.push("Archive path cannot be empty".to_string());
        }
        if self.compression_level > 9 {
            errors.push(format!(
                "Compression level {} is out of range (0-9)",
                self.compression_level
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Scan(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Scan(msg) => write!(f, "Scan: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl BaselineConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(scan) = self.scan.validate() {
            errors.extend(scan.into_iter().map(ValidationError::Scan));
        }
        if let Err(storage) = self.storage.validate() {
            errors.extend(storage.into_iter().map(ValidationError::Storage));
        }
        if let Err(logging) = self.logging.validate() {
            errors.push(ValidationError::Logging(logging));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
