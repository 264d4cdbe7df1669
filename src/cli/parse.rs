//! CLI parse: clap types for Baseline. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Baseline CLI - filesystem integrity snapshots and drift reports
#[derive(Parser)]
#[command(name = "baseline")]
#[command(about = "Snapshot a filesystem tree and report what changed since")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Never colorize report output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Scan overrides shared by build and compare
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Root of the tree to snapshot or compare
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Files larger than this many bytes are stored as digests
    #[arg(long)]
    pub size_threshold: Option<u64>,

    /// Skip paths longer than this many characters
    #[arg(long)]
    pub max_path_len: Option<usize>,

    /// Additional absolute path to exclude (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    pub exclude: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a snapshot of the tree and pack it into an archive
    Build {
        #[command(flatten)]
        scan: ScanArgs,
        /// Directory to build the snapshot tree into
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,
        /// Archive to write
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Keep the uncompressed snapshot directory after packing
        #[arg(long)]
        keep_dir: bool,
        /// Only build the snapshot directory; do not pack it
        #[arg(long, conflicts_with = "keep_dir")]
        no_archive: bool,
        /// Replace an existing, non-empty snapshot directory
        #[arg(long)]
        force: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Compare the live tree against a snapshot
    Compare {
        #[command(flatten)]
        scan: ScanArgs,
        /// Archive to compare against
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Compare against an unpacked snapshot directory instead of an archive
        #[arg(long, conflicts_with = "archive")]
        snapshot_dir: Option<PathBuf>,
        /// Also print unchanged paths
        #[arg(long)]
        show_unchanged: bool,
        /// Print root-relative paths instead of absolute ones
        #[arg(long)]
        relative: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Summarize the contents of a snapshot
    Show {
        /// Archive to inspect
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Inspect an unpacked snapshot directory instead of an archive
        #[arg(long, conflicts_with = "archive")]
        snapshot_dir: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}
