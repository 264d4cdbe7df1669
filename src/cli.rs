//! CLI domain: parse, route, output, and presentation only.
//! No snapshot logic; the route table dispatches to the library.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ScanArgs};
pub use presentation::{
    format_build_report_json, format_build_report_text, format_diff_record_json,
    format_diff_record_text, format_diff_summary, format_index_json, format_index_table,
    IndexStats, RecordStyle,
};
pub use route::RunContext;
