//! Snapshot loader: rebuilds the in-memory index from a stored snapshot

use crate::error::{ApiError, StorageError};
use crate::snapshot::sidecar;
use crate::tree::path;
use crate::types::{FileKind, FileRecord};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, trace, warn};
use walkdir::WalkDir;

/// In-memory view of a stored snapshot, keyed by relative path
///
/// Read-only after loading; lookups need no locking.
#[derive(Debug, Clone)]
pub struct SnapshotIndex {
    storage_root: PathBuf,
    records: HashMap<String, FileRecord>,
}

impl SnapshotIndex {
    /// Load the index from a snapshot storage root
    ///
    /// Sidecars become large records, any other file a small record sized
    /// from its stored copy. Malformed sidecars still register their path,
    /// with the unreadable fields left empty. Entries whose path under
    /// `live_root` would be longer than `max_path_len` are skipped; the
    /// length of the storage prefix never matters.
    #[instrument(fields(storage = %storage_root.display(), live_root = %live_root.display()))]
    pub fn load(storage_root: &Path, live_root: &Path, max_path_len: usize) -> Result<Self, ApiError> {
        let live_root = path::absolutize(live_root)?;
        Self::read(storage_root, Some((&live_root, max_path_len)))
    }

    /// Load every stored entry, without a path-length ceiling
    pub fn open(storage_root: &Path) -> Result<Self, ApiError> {
        Self::read(storage_root, None)
    }

    fn read(storage_root: &Path, ceiling: Option<(&Path, usize)>) -> Result<Self, ApiError> {
        let start = Instant::now();
        let storage_root = path::absolutize(storage_root)?;
        if !storage_root.is_dir() {
            return Err(ApiError::SnapshotNotFound(storage_root));
        }

        let mut records = HashMap::new();
        let mut malformed = 0usize;

        let walk = WalkDir::new(&storage_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let Some((live_root, max_path_len)) = ceiling else {
                    return true;
                };
                let Some(key) = path::relative_key(&storage_root, entry.path()) else {
                    return true;
                };
                let key = if entry.file_type().is_file() {
                    sidecar::described_key(&key).unwrap_or(key.as_str())
                } else {
                    key.as_str()
                };
                let len = path::char_len(&path::join_key(live_root, key));
                if len > max_path_len {
                    trace!(path = %entry.path().display(), len, "Live path exceeds length ceiling, skipping");
                    return false;
                }
                true
            });

        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable snapshot entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(key) = path::relative_key(&storage_root, entry.path()) else {
                continue;
            };

            let record = match sidecar::described_key(&key) {
                Some(described) => {
                    let record = read_sidecar(entry.path(), described);
                    if record.is_malformed() {
                        malformed += 1;
                    }
                    record
                }
                None => {
                    let size = match entry.metadata() {
                        Ok(m) => Some(m.len()),
                        Err(e) => {
                            warn!(path = %entry.path().display(), error = %e, "Failed to read metadata");
                            None
                        }
                    };
                    FileRecord::small(key, size)
                }
            };

            if let Some(previous) = records.insert(record.relative_path.clone(), record) {
                warn!(path = %previous.relative_path, "Snapshot holds both a copy and a sidecar for this path");
            }
        }

        info!(
            records = records.len(),
            malformed,
            duration_ms = start.elapsed().as_millis(),
            "Snapshot index loaded"
        );

        Ok(Self {
            storage_root,
            records,
        })
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn get(&self, relative_path: &str) -> Option<&FileRecord> {
        self.records.get(relative_path)
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.records.contains_key(relative_path)
    }

    /// Records in unspecified order
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Where the full copy of a small record lives
    pub fn stored_copy_path(&self, relative_path: &str) -> PathBuf {
        path::join_key(&self.storage_root, relative_path)
    }

    /// Records whose stored size contradicts `size_threshold`
    ///
    /// A non-zero count means the snapshot was built with a different
    /// threshold than the one now configured.
    pub fn threshold_violations(&self, size_threshold: u64) -> usize {
        self.records
            .values()
            .filter(|r| match (r.kind, r.size) {
                (FileKind::Small, Some(size)) => size > size_threshold,
                (FileKind::Large, Some(size)) => size <= size_threshold,
                _ => false,
            })
            .count()
    }
}

fn read_sidecar(sidecar_file: &Path, described: &str) -> FileRecord {
    let text = match fs::read_to_string(sidecar_file) {
        Ok(text) => text,
        Err(e) => {
            let err = StorageError::io(sidecar_file, e);
            warn!(path = %sidecar_file.display(), error = %err, "Failed to read sidecar");
            return FileRecord::large(described, None, None);
        }
    };
    let (parsed, problems) = sidecar::decode(&text, sidecar_file);
    for problem in &problems {
        warn!(path = %sidecar_file.display(), error = %problem, "Malformed sidecar, path will report as modified");
    }
    FileRecord::large(described, parsed.digest, parsed.size)
}
