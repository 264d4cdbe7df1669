//! Snapshot builder: materializes a snapshot of the live tree on disk

use crate::error::{ApiError, StorageError};
use crate::snapshot::sidecar;
use crate::tree::filter::PathFilter;
use crate::tree::walker::{WalkedFile, Walker};
use crate::tree::{hasher, path};
use crate::types::{FileKind, DEFAULT_SIZE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// A file that could not be captured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a build. Failures are per file; the snapshot is best-effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    pub storage_root: PathBuf,
    pub files_seen: u64,
    /// Small files stored as full copies
    pub copied: u64,
    /// Large files stored as sidecars
    pub hashed: u64,
    pub bytes_copied: u64,
    pub bytes_hashed: u64,
    pub failures: Vec<PathFailure>,
    pub duration_ms: u128,
    /// RFC 3339 completion time
    pub finished_at: String,
}

/// Builds a snapshot of `source_root` under `storage_root`
///
/// Files strictly larger than the size threshold become `<path>.hash`
/// sidecars; everything else is copied verbatim into the mirrored path.
pub struct SnapshotBuilder {
    source_root: PathBuf,
    storage_root: PathBuf,
    filter: PathFilter,
    size_threshold: u64,
}

impl SnapshotBuilder {
    pub fn new(source_root: PathBuf, storage_root: PathBuf) -> Self {
        Self {
            source_root,
            storage_root,
            filter: PathFilter::default(),
            size_threshold: DEFAULT_SIZE_THRESHOLD,
        }
    }

    /// Replace the exclusion filter. The storage root is always excluded on top of it.
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_size_threshold(mut self, size_threshold: u64) -> Self {
        self.size_threshold = size_threshold;
        self
    }

    /// Walk the source tree and write the snapshot
    ///
    /// Only failing to create the storage root is fatal. Every per-file
    /// failure is logged, recorded in the report and skipped.
    #[instrument(skip(self), fields(source = %self.source_root.display(), storage = %self.storage_root.display()))]
    pub fn build(&self) -> Result<BuildReport, ApiError> {
        let start = Instant::now();
        info!(size_threshold = self.size_threshold, "Starting snapshot build");

        let storage_root = path::absolutize(&self.storage_root)?;
        fs::create_dir_all(&storage_root).map_err(|e| StorageError::io(&storage_root, e))?;

        let filter = self.filter.clone().with_excluded(&storage_root);
        let walker = Walker::new(self.source_root.clone(), &filter);

        let mut report = BuildReport {
            storage_root: storage_root.clone(),
            ..BuildReport::default()
        };

        for file in walker.files() {
            report.files_seen += 1;
            match self.store_file(&file, &storage_root) {
                Ok(FileKind::Small) => {
                    report.copied += 1;
                    report.bytes_copied += file.size;
                }
                Ok(FileKind::Large) => {
                    report.hashed += 1;
                    report.bytes_hashed += file.size;
                }
                Err(e) => {
                    warn!(path = %file.absolute_path.display(), error = %e, "Failed to capture file");
                    report.failures.push(PathFailure {
                        path: file.absolute_path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis();
        report.finished_at = chrono::Utc::now().to_rfc3339();
        info!(
            files_seen = report.files_seen,
            copied = report.copied,
            hashed = report.hashed,
            failures = report.failures.len(),
            duration_ms = report.duration_ms,
            "Snapshot build completed"
        );
        Ok(report)
    }

    fn store_file(&self, file: &WalkedFile, storage_root: &Path) -> Result<FileKind, StorageError> {
        let mirrored = path::join_key(storage_root, &file.relative_path);
        if let Some(parent) = mirrored.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        if file.size > self.size_threshold {
            let target = sidecar::sidecar_path(&mirrored);
            ensure_vacant(&target)?;
            let digest = hasher::compute_file_digest(&file.absolute_path)?;
            fs::write(&target, sidecar::encode(&digest, file.size))
                .map_err(|e| StorageError::io(&target, e))?;
            debug!(path = %file.relative_path, size = file.size, digest = %hasher::to_hex(&digest), "Wrote sidecar");
            Ok(FileKind::Large)
        } else {
            ensure_vacant(&mirrored)?;
            fs::copy(&file.absolute_path, &mirrored)
                .map_err(|e| StorageError::io(&file.absolute_path, e))?;
            preserve_mtime(&file.absolute_path, &mirrored);
            trace!(path = %file.relative_path, size = file.size, "Copied file");
            Ok(FileKind::Small)
        }
    }
}

/// A second source entry mapping onto an existing snapshot entry (a small
/// `x.hash` next to a large `x`) would silently replace it.
fn ensure_vacant(target: &Path) -> Result<(), StorageError> {
    if target.symlink_metadata().is_ok() {
        return Err(StorageError::InvalidPath(format!(
            "{} collides with an existing snapshot entry",
            target.display()
        )));
    }
    Ok(())
}

fn preserve_mtime(source: &Path, copy: &Path) {
    let result = fs::metadata(source)
        .and_then(|m| m.modified())
        .and_then(|mtime| fs::File::options().write(true).open(copy)?.set_modified(mtime));
    if let Err(e) = result {
        debug!(path = %copy.display(), error = %e, "Could not preserve modification time");
    }
}
