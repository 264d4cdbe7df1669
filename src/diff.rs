//! Diff engine: reconciles a stored snapshot against the live tree.
//!
//! Every live file is classified while the walk runs (New, Modified or
//! Unchanged, in walk order); snapshot paths never seen live are reported as
//! Removed afterwards, in unspecified order. A record that cannot be checked
//! (malformed sidecar, missing stored copy, unreadable file) is reported as
//! Modified, never as Unchanged.

use crate::error::StorageError;
use crate::snapshot::loader::SnapshotIndex;
use crate::tree::filter::PathFilter;
use crate::tree::hasher;
use crate::tree::walker::{WalkedFile, Walker};
use crate::types::{DiffKind, DiffRecord, FileKind, FileRecord, DEFAULT_SIZE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Counts per classification for one diff pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub new: u64,
    pub modified: u64,
    pub removed: u64,
    pub unchanged: u64,
    /// Files that could not be read; each is also counted as modified
    pub errors: u64,
}

impl DiffSummary {
    fn count(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::New => self.new += 1,
            DiffKind::Modified => self.modified += 1,
            DiffKind::Removed => self.removed += 1,
            DiffKind::Unchanged => self.unchanged += 1,
        }
    }

    /// True when nothing differs from the snapshot
    pub fn is_clean(&self) -> bool {
        self.new == 0 && self.modified == 0 && self.removed == 0
    }
}

/// Compares a snapshot index with the tree under `live_root`
pub struct DiffEngine<'a> {
    index: &'a SnapshotIndex,
    live_root: PathBuf,
    filter: PathFilter,
    size_threshold: u64,
}

impl<'a> DiffEngine<'a> {
    pub fn new(index: &'a SnapshotIndex, live_root: PathBuf) -> Self {
        Self {
            index,
            live_root,
            filter: PathFilter::default(),
            size_threshold: DEFAULT_SIZE_THRESHOLD,
        }
    }

    /// Replace the exclusion filter. The snapshot's storage root is always
    /// excluded on top of it; add any staging directory here.
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Must match the threshold the snapshot was built with
    pub fn with_size_threshold(mut self, size_threshold: u64) -> Self {
        self.size_threshold = size_threshold;
        self
    }

    /// Run one diff pass, handing each record to `emit` as it is classified
    #[instrument(skip(self, emit), fields(live_root = %self.live_root.display(), storage = %self.index.storage_root().display()))]
    pub fn run<F>(&self, mut emit: F) -> DiffSummary
    where
        F: FnMut(&DiffRecord),
    {
        let start = Instant::now();
        let violations = self.index.threshold_violations(self.size_threshold);
        if violations > 0 {
            warn!(
                violations,
                size_threshold = self.size_threshold,
                "Snapshot appears to have been built with a different size threshold"
            );
        }

        let index: &'a SnapshotIndex = self.index;
        let filter = self.filter.clone().with_excluded(index.storage_root());
        let walker = Walker::new(self.live_root.clone(), &filter);

        let mut summary = DiffSummary::default();
        let mut seen: HashSet<&'a str> = HashSet::with_capacity(index.len());

        for file in walker.files() {
            let kind = match index.get(&file.relative_path) {
                None => DiffKind::New,
                Some(record) => {
                    seen.insert(record.relative_path.as_str());
                    match self.classify(&file, record) {
                        Ok(kind) => kind,
                        Err(e) => {
                            warn!(path = %file.absolute_path.display(), error = %e, "Could not compare file, reporting as modified");
                            summary.errors += 1;
                            DiffKind::Modified
                        }
                    }
                }
            };
            debug!(path = %file.relative_path, kind = %kind, "Classified");
            summary.count(kind);
            emit(&DiffRecord::new(kind, file.relative_path));
        }

        for record in index.records() {
            if !seen.contains(record.relative_path.as_str()) {
                summary.count(DiffKind::Removed);
                emit(&DiffRecord::new(DiffKind::Removed, record.relative_path.clone()));
            }
        }

        info!(
            new = summary.new,
            modified = summary.modified,
            removed = summary.removed,
            unchanged = summary.unchanged,
            errors = summary.errors,
            duration_ms = start.elapsed().as_millis(),
            "Diff completed"
        );
        summary
    }

    /// Run one diff pass and collect every record
    pub fn collect(&self) -> (Vec<DiffRecord>, DiffSummary) {
        let mut records = Vec::new();
        let summary = self.run(|record| records.push(record.clone()));
        (records, summary)
    }

    fn classify(&self, file: &WalkedFile, record: &FileRecord) -> Result<DiffKind, StorageError> {
        match record.kind {
            FileKind::Large => self.classify_large(file, record),
            FileKind::Small => self.classify_small(file),
        }
    }

    fn classify_large(&self, file: &WalkedFile, record: &FileRecord) -> Result<DiffKind, StorageError> {
        let (Some(expected), Some(size)) = (record.digest, record.size) else {
            return Ok(DiffKind::Modified);
        };
        if size != file.size {
            return Ok(DiffKind::Modified);
        }
        let actual = hasher::compute_file_digest(&file.absolute_path)?;
        Ok(same(expected == actual))
    }

    fn classify_small(&self, file: &WalkedFile) -> Result<DiffKind, StorageError> {
        let copy = self.index.stored_copy_path(&file.relative_path);
        let copy_size = match fs::symlink_metadata(&copy) {
            Ok(m) if m.is_file() => m.len(),
            _ => {
                debug!(path = %file.relative_path, "Stored copy missing");
                return Ok(DiffKind::Modified);
            }
        };
        if copy_size != file.size {
            return Ok(DiffKind::Modified);
        }
        if file.size <= self.size_threshold {
            Ok(same(read(&file.absolute_path)? == read(&copy)?))
        } else {
            // Grew past the threshold since the snapshot; stream instead of buffering.
            let live = hasher::compute_file_digest(&file.absolute_path)?;
            let stored = hasher::compute_file_digest(&copy)?;
            Ok(same(live == stored))
        }
    }
}

fn same(equal: bool) -> DiffKind {
    if equal {
        DiffKind::Unchanged
    } else {
        DiffKind::Modified
    }
}

fn read(path: &Path) -> Result<Vec<u8>, StorageError> {
    fs::read(path).map_err(|e| StorageError::io(path, e))
}
