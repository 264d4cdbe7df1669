//! Sidecar records for large files.
//!
//! A large file at relative path `p` is stored as `p.hash`, two text lines:
//!
//! ```text
//! HASH: <64 lowercase hex chars>
//! SIZE: <decimal bytes>
//! ```
//!
//! The layout cannot tell a sidecar from a small source file that happens to
//! end in `.hash`: a copied `notes.hash` loads back as a malformed large record
//! for `notes`, so an untouched tree reports `NEW: notes.hash` and
//! `REMOVED: notes`. A small `x.hash` beside a large `x` is refused by the
//! builder instead.

use crate::error::StorageError;
use crate::tree::hasher;
use crate::types::{Hash, SIDECAR_EXTENSION};
use std::path::{Path, PathBuf};

const HASH_PREFIX: &str = "HASH: ";
const SIZE_PREFIX: &str = "SIZE: ";

/// Parsed sidecar fields. Either may be missing when the sidecar is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sidecar {
    pub digest: Option<Hash>,
    pub size: Option<u64>,
}

/// Render the sidecar text for a digest and size
pub fn encode(digest: &Hash, size: u64) -> String {
    format!(
        "{}{}\n{}{}\n",
        HASH_PREFIX,
        hasher::to_hex(digest),
        SIZE_PREFIX,
        size
    )
}

/// Parse sidecar text
///
/// Unparseable or missing fields come back as `None` and are reported in the
/// error list rather than failing the parse, so the loader can still register
/// the path.
pub fn decode(text: &str, source: &Path) -> (Sidecar, Vec<StorageError>) {
    let mut sidecar = Sidecar::default();
    let mut problems = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix(HASH_PREFIX) {
            sidecar.digest = hasher::from_hex(value.trim());
            if sidecar.digest.is_none() {
                problems.push(malformed(source, format!("invalid HASH value {:?}", value)));
            }
        } else if let Some(value) = line.strip_prefix(SIZE_PREFIX) {
            sidecar.size = value.trim().parse().ok();
            if sidecar.size.is_none() {
                problems.push(malformed(source, format!("invalid SIZE value {:?}", value)));
            }
        }
    }

    let saw_hash = text.lines().any(|l| l.trim().starts_with(HASH_PREFIX));
    let saw_size = text.lines().any(|l| l.trim().starts_with(SIZE_PREFIX));
    if !saw_hash {
        problems.push(malformed(source, "missing HASH line".to_string()));
    }
    if !saw_size {
        problems.push(malformed(source, "missing SIZE line".to_string()));
    }

    (sidecar, problems)
}

fn malformed(path: &Path, reason: String) -> StorageError {
    StorageError::MalformedSidecar {
        path: path.to_path_buf(),
        reason,
    }
}

/// Storage path of the sidecar for a mirrored file path
pub fn sidecar_path(mirrored: &Path) -> PathBuf {
    let mut name = mirrored.as_os_str().to_os_string();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// If `relative_key` names a sidecar, the key of the file it describes
pub fn described_key(relative_key: &str) -> Option<&str> {
    let stem = relative_key.strip_suffix(SIDECAR_EXTENSION)?.strip_suffix('.')?;
    let file_name = stem.rsplit('/').next().unwrap_or(stem);
    if file_name.is_empty() {
        None
    } else {
        Some(stem)
    }
}
