//! Diff presentation: one line per record, `<KIND>: <path>`.

use crate::diff::DiffSummary;
use crate::error::ApiError;
use crate::tree::path;
use crate::types::{DiffKind, DiffRecord};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// How records are rendered
#[derive(Debug, Clone, Default)]
pub struct RecordStyle {
    /// Join live record paths onto this root; None prints root-relative paths.
    /// Removed records name snapshot entries and always stay relative.
    pub root: Option<PathBuf>,
    /// Colorize the kind label (terminal output only)
    pub color: bool,
}

impl RecordStyle {
    fn display_path(&self, record: &DiffRecord) -> String {
        match (&self.root, record.kind) {
            (Some(root), kind) if kind != DiffKind::Removed => {
                path::join_key(root, &record.path).display().to_string()
            }
            _ => record.path.clone(),
        }
    }
}

pub fn format_diff_record_text(record: &DiffRecord, style: &RecordStyle) -> String {
    let label = record.kind.label();
    let path = style.display_path(record);
    if !style.color {
        return format!("{}: {}", label, path);
    }
    let label = match record.kind {
        DiffKind::New => label.green().to_string(),
        DiffKind::Modified => label.yellow().to_string(),
        DiffKind::Removed => label.red().to_string(),
        DiffKind::Unchanged => label.dimmed().to_string(),
    };
    format!("{}: {}", label, path)
}

pub fn format_diff_record_json(record: &DiffRecord, style: &RecordStyle) -> Result<String, ApiError> {
    let value = serde_json::json!({
        "kind": record.kind,
        "path": style.display_path(record),
    });
    serde_json::to_string(&value).map_err(|e| ApiError::Output(e.to_string()))
}

pub fn format_diff_summary(summary: &DiffSummary) -> String {
    let mut s = format!(
        "{} new, {} modified, {} removed, {} unchanged",
        summary.new, summary.modified, summary.removed, summary.unchanged
    );
    if summary.errors > 0 {
        s.push_str(&format!(
            " ({} could not be read and are reported as modified)",
            summary.errors
        ));
    }
    s
}
