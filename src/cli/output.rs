//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a single line for stderr.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Archive(_) => format!("{}. No snapshot or comparison was produced.", e),
        ApiError::SnapshotNotFound(path) => format!(
            "Snapshot not found: {}. Run `baseline build` first or pass --archive/--snapshot-dir.",
            path.display()
        ),
        ApiError::RootNotFound(path) => format!(
            "Scan root {} does not exist or is not a directory. Check --root or scan.root.",
            path.display()
        ),
        ApiError::SnapshotDirOccupied(path) => format!(
            "Snapshot directory {} is not empty. Pass --force to replace it.",
            path.display()
        ),
        _ => e.to_string(),
    }
}
