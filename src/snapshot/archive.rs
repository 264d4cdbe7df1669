//! Snapshot transport: packing a snapshot directory into one portable file
//! and unpacking it again.
//!
//! The engine only needs the round trip to preserve the directory and sidecar
//! layout. `unpack` returns the snapshot root directly, so callers never have
//! to guess which extracted directory is the snapshot.

use crate::error::ApiError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, instrument};

/// Prefix of staging directories created for extraction
pub const EXTRACT_PREFIX: &str = "baseline_extract_";

/// Archival collaborator
pub trait SnapshotArchive {
    /// Write the tree under `storage_root` into `archive_path`
    fn pack(&self, storage_root: &Path, archive_path: &Path) -> Result<(), ApiError>;

    /// Extract `archive_path` under `dest` and return the snapshot root
    fn unpack(&self, archive_path: &Path, dest: &Path) -> Result<PathBuf, ApiError>;
}

/// Gzip-compressed tar archive with entries relative to the snapshot root
#[derive(Debug, Clone, Copy)]
pub struct TarGzArchive {
    level: u32,
}

impl Default for TarGzArchive {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl TarGzArchive {
    pub fn with_level(level: u32) -> Self {
        Self { level: level.min(9) }
    }
}

impl SnapshotArchive for TarGzArchive {
    #[instrument(skip(self), fields(storage = %storage_root.display(), archive = %archive_path.display()))]
    fn pack(&self, storage_root: &Path, archive_path: &Path) -> Result<(), ApiError> {
        if !storage_root.is_dir() {
            return Err(ApiError::SnapshotNotFound(storage_root.to_path_buf()));
        }
        if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| archive_err("create directory for", parent, e))?;
        }

        let file = File::create(archive_path).map_err(|e| archive_err("create", archive_path, e))?;
        let encoder = GzEncoder::new(file, Compression::new(self.level));
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);
        builder
            .append_dir_all("", storage_root)
            .map_err(|e| archive_err("write entries into", archive_path, e))?;
        let encoder = builder
            .into_inner()
            .map_err(|e| archive_err("finish", archive_path, e))?;
        encoder
            .finish()
            .map_err(|e| archive_err("flush", archive_path, e))?;

        info!("Snapshot archived");
        Ok(())
    }

    #[instrument(skip(self), fields(archive = %archive_path.display(), dest = %dest.display()))]
    fn unpack(&self, archive_path: &Path, dest: &Path) -> Result<PathBuf, ApiError> {
        if !archive_path.is_file() {
            return Err(ApiError::SnapshotNotFound(archive_path.to_path_buf()));
        }
        fs::create_dir_all(dest).map_err(|e| archive_err("create", dest, e))?;

        let file = File::open(archive_path).map_err(|e| archive_err("open", archive_path, e))?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive.set_preserve_mtime(true);
        archive
            .unpack(dest)
            .map_err(|e| archive_err("extract", archive_path, e))?;

        info!("Snapshot extracted");
        Ok(dest.to_path_buf())
    }
}

fn archive_err(action: &str, path: &Path, e: std::io::Error) -> ApiError {
    ApiError::Archive(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// An archive extracted into a temporary directory
///
/// The directory is removed when this value is dropped, on every exit path.
pub struct StagedSnapshot {
    staging: TempDir,
    root: PathBuf,
}

impl StagedSnapshot {
    /// Extract `archive_path` into a fresh staging directory under `parent`
    /// (the system temp dir when None)
    pub fn extract(
        archive: &dyn SnapshotArchive,
        archive_path: &Path,
        parent: Option<&Path>,
    ) -> Result<Self, ApiError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix(EXTRACT_PREFIX);
            b
        };
        let staging = match parent {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
        .map_err(|e| ApiError::Archive(format!("Failed to create staging directory: {}", e)))?;

        let root = archive.unpack(archive_path, staging.path())?;
        Ok(Self { staging, root })
    }

    /// Snapshot root inside the staging directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The whole staging directory, to be excluded from live walks
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }
}
