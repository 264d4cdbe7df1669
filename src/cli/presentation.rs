//! CLI presentation: text and json formatters per command family.

mod diff;
mod snapshot;

pub use diff::{format_diff_record_json, format_diff_record_text, format_diff_summary, RecordStyle};
pub use snapshot::{
    format_build_report_json, format_build_report_text, format_index_json, format_index_table,
    IndexStats,
};
