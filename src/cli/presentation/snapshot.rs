//! Snapshot presentation: build reports and index summaries.

use crate::error::ApiError;
use crate::snapshot::{BuildReport, SnapshotIndex};
use crate::types::FileKind;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub fn format_build_report_text(report: &BuildReport, archive: Option<&Path>) -> String {
    let mut s = format!(
        "Snapshot built at {}:\n  Files: {}\n  Copied: {} ({} bytes)\n  Hashed: {} ({} bytes)\n  Duration: {} ms",
        report.finished_at,
        report.files_seen,
        report.copied,
        report.bytes_copied,
        report.hashed,
        report.bytes_hashed,
        report.duration_ms,
    );
    match archive {
        Some(archive) => s.push_str(&format!("\n  Archive: {}", archive.display())),
        None => s.push_str(&format!("\n  Directory: {}", report.storage_root.display())),
    }
    if !report.failures.is_empty() {
        s.push_str(&format!("\n\nSkipped ({}):", report.failures.len()));
        for failure in &report.failures {
            s.push_str(&format!("\n  - {}: {}", failure.path.display(), failure.error));
        }
    }
    s
}

pub fn format_build_report_json(report: &BuildReport, archive: Option<&Path>) -> Result<String, ApiError> {
    let mut value = serde_json::to_value(report).map_err(|e| ApiError::Output(e.to_string()))?;
    if let (Some(archive), Some(obj)) = (archive, value.as_object_mut()) {
        obj.insert(
            "archive".to_string(),
            serde_json::Value::String(archive.display().to_string()),
        );
    }
    serde_json::to_string_pretty(&value).map_err(|e| ApiError::Output(e.to_string()))
}

/// Aggregate counts over a loaded snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub records: u64,
    pub small: u64,
    pub large: u64,
    pub malformed: u64,
    pub small_bytes: u64,
    pub large_bytes: u64,
}

impl IndexStats {
    pub fn from_index(index: &SnapshotIndex) -> Self {
        let mut stats = IndexStats::default();
        for record in index.records() {
            stats.records += 1;
            let size = record.size.unwrap_or(0);
            match record.kind {
                FileKind::Small => {
                    stats.small += 1;
                    stats.small_bytes += size;
                }
                FileKind::Large => {
                    stats.large += 1;
                    stats.large_bytes += size;
                    if record.is_malformed() {
                        stats.malformed += 1;
                    }
                }
            }
        }
        stats
    }
}

pub fn format_index_table(stats: &IndexStats) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Kind", "Records", "Bytes"]);
    table.add_row(vec![
        "small (copied)".to_string(),
        stats.small.to_string(),
        stats.small_bytes.to_string(),
    ]);
    table.add_row(vec![
        "large (hashed)".to_string(),
        stats.large.to_string(),
        stats.large_bytes.to_string(),
    ]);
    table.add_row(vec![
        "malformed sidecars".to_string(),
        stats.malformed.to_string(),
        "-".to_string(),
    ]);
    table.add_row(vec![
        "total".to_string(),
        stats.records.to_string(),
        (stats.small_bytes + stats.large_bytes).to_string(),
    ]);
    table.to_string()
}

pub fn format_index_json(stats: &IndexStats) -> Result<String, ApiError> {
    serde_json::to_string_pretty(stats).map_err(|e| ApiError::Output(e.to_string()))
}
