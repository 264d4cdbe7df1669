//! Error types for snapshot building, loading and diffing.

use std::path::PathBuf;
use thiserror::Error;

/// Per-path errors. Callers absorb these and keep processing other paths.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed sidecar {path:?}: {reason}")]
    MalformedSidecar { path: PathBuf, reason: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Operation-level errors. These terminate the build, compare or show command.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("Scan root is not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Snapshot directory is not empty: {}", .0.display())]
    SnapshotDirOccupied(PathBuf),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
