//! CLI route: single route table and run context. Dispatches to the library and presentation.

use crate::config::{BaselineConfig, ConfigLoader, ScanConfig};
use crate::diff::DiffEngine;
use crate::error::{ApiError, StorageError};
use crate::snapshot::{SnapshotArchive, SnapshotBuilder, SnapshotIndex, StagedSnapshot, TarGzArchive};
use crate::tree::path;
use crate::types::DiffKind;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cli::parse::{Commands, ScanArgs};
use crate::cli::presentation::{
    format_build_report_json, format_build_report_text, format_diff_record_json,
    format_diff_record_text, format_diff_summary, format_index_json, format_index_table,
    IndexStats, RecordStyle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

fn parse_report_format(format: &str) -> Result<ReportFormat, ApiError> {
    match format {
        "text" => Ok(ReportFormat::Text),
        "json" => Ok(ReportFormat::Json),
        other => Err(ApiError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn output_err(e: std::io::Error) -> ApiError {
    ApiError::Output(e.to_string())
}

/// Runtime context for CLI execution: the effective configuration and terminal settings.
pub struct RunContext {
    config: BaselineConfig,
    color: bool,
}

impl RunContext {
    /// Load configuration from `config_path`, or from the layered sources for
    /// the current directory when None.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => {
                let cwd = std::env::current_dir().map_err(|e| StorageError::io(".", e))?;
                ConfigLoader::load(&cwd)?
            }
        };
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: BaselineConfig) -> Self {
        Self {
            config,
            color: false,
        }
    }

    /// Colorize diff labels
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    ///
    /// Reports go to `out`; the compare summary goes to `diag`.
    pub fn execute(
        &self,
        command: &Commands,
        out: &mut dyn Write,
        diag: &mut dyn Write,
    ) -> Result<(), ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Build {
                scan,
                snapshot_dir,
                archive,
                keep_dir,
                no_archive,
                force,
                format,
            } => self.handle_build(
                scan,
                snapshot_dir.as_deref(),
                archive.as_deref(),
                *keep_dir,
                *no_archive,
                *force,
                format,
                out,
            ),
            Commands::Compare {
                scan,
                archive,
                snapshot_dir,
                show_unchanged,
                relative,
                format,
            } => self.handle_compare(
                scan,
                archive.as_deref(),
                snapshot_dir.as_deref(),
                *show_unchanged,
                *relative,
                format,
                out,
                diag,
            ),
            Commands::Show {
                archive,
                snapshot_dir,
                format,
            } => self.handle_show(archive.as_deref(), snapshot_dir.as_deref(), format, out),
            Commands::Config => {
                let rendered = ConfigLoader::render(&self.config)?;
                write!(out, "{}", rendered).map_err(output_err)
            }
        };
        debug!(
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis(),
            "Command finished"
        );
        result
    }

    /// Effective scan settings: configuration with CLI overrides applied
    fn scan_config(&self, args: &ScanArgs) -> Result<ScanConfig, ApiError> {
        let mut scan = self.config.scan.clone();
        if let Some(ref root) = args.root {
            scan.root = root.clone();
        }
        if let Some(size_threshold) = args.size_threshold {
            scan.size_threshold = size_threshold;
        }
        if let Some(max_path_len) = args.max_path_len {
            scan.max_path_len = max_path_len;
        }
        for excluded in &args.exclude {
            scan.excluded_paths.push(path::absolutize(excluded)?);
        }
        scan.validate()
            .map_err(|errors| ApiError::ConfigError(errors.join("; ")))?;
        Ok(scan)
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_build(
        &self,
        args: &ScanArgs,
        snapshot_dir: Option<&Path>,
        archive: Option<&Path>,
        keep_dir: bool,
        no_archive: bool,
        force: bool,
        format: &str,
        out: &mut dyn Write,
    ) -> Result<(), ApiError> {
        let format = parse_report_format(format)?;
        let scan = self.scan_config(args)?;
        let source_root = scan_root(&scan)?;
        let snapshot_dir =
            path::absolutize(snapshot_dir.unwrap_or(&self.config.storage.snapshot_dir))?;
        let archive_path = path::absolutize(archive.unwrap_or(&self.config.storage.archive))?;

        prepare_snapshot_dir(&snapshot_dir, force)?;

        let filter = scan.path_filter().with_excluded(&archive_path);
        let report = SnapshotBuilder::new(source_root, snapshot_dir.clone())
            .with_filter(filter)
            .with_size_threshold(scan.size_threshold)
            .build()?;

        let packed = if no_archive {
            None
        } else {
            TarGzArchive::with_level(self.config.storage.compression_level)
                .pack(&snapshot_dir, &archive_path)?;
            if !(keep_dir || self.config.storage.keep_snapshot_dir) {
                fs::remove_dir_all(&snapshot_dir)
                    .map_err(|e| StorageError::io(&snapshot_dir, e))?;
            }
            Some(archive_path)
        };

        let rendered = match format {
            ReportFormat::Text => format_build_report_text(&report, packed.as_deref()),
            ReportFormat::Json => format_build_report_json(&report, packed.as_deref())?,
        };
        writeln!(out, "{}", rendered).map_err(output_err)
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_compare(
        &self,
        args: &ScanArgs,
        archive: Option<&Path>,
        snapshot_dir: Option<&Path>,
        show_unchanged: bool,
        relative: bool,
        format: &str,
        out: &mut dyn Write,
        diag: &mut dyn Write,
    ) -> Result<(), ApiError> {
        let format = parse_report_format(format)?;
        let scan = self.scan_config(args)?;
        let live_root = scan_root(&scan)?;
        let archive_path = path::absolutize(archive.unwrap_or(&self.config.storage.archive))?;

        let mut filter = scan
            .path_filter()
            .with_excluded(path::absolutize(&self.config.storage.snapshot_dir)?)
            .with_excluded(&archive_path);

        // Dropping the staged snapshot removes the extraction directory
        let staged = match snapshot_dir {
            Some(_) => None,
            None => Some(StagedSnapshot::extract(
                &TarGzArchive::default(),
                &archive_path,
                self.config.storage.staging_dir.as_deref(),
            )?),
        };
        let storage_root = match (&staged, snapshot_dir) {
            (Some(staged), _) => {
                filter = filter.with_excluded(staged.staging_dir());
                staged.root().to_path_buf()
            }
            (None, Some(dir)) => path::absolutize(dir)?,
            (None, None) => return Err(ApiError::SnapshotNotFound(archive_path)),
        };

        let index = SnapshotIndex::load(&storage_root, &live_root, scan.max_path_len)?;
        info!(records = index.len(), "Snapshot index loaded");

        let style = RecordStyle {
            root: if relative { None } else { Some(live_root.clone()) },
            color: self.color && format == ReportFormat::Text,
        };

        let mut write_error: Option<ApiError> = None;
        let summary = DiffEngine::new(&index, live_root)
            .with_filter(filter)
            .with_size_threshold(scan.size_threshold)
            .run(|record| {
                if write_error.is_some() {
                    return;
                }
                if record.kind == DiffKind::Unchanged && !show_unchanged {
                    return;
                }
                let line = match format {
                    ReportFormat::Text => Ok(format_diff_record_text(record, &style)),
                    ReportFormat::Json => format_diff_record_json(record, &style),
                };
                if let Err(e) = line.and_then(|line| writeln!(out, "{}", line).map_err(output_err)) {
                    write_error = Some(e);
                }
            });
        if let Some(e) = write_error {
            return Err(e);
        }

        if summary.errors > 0 {
            warn!(errors = summary.errors, "Some files could not be compared");
        }
        writeln!(diag, "{}", format_diff_summary(&summary)).map_err(output_err)
    }

    fn handle_show(
        &self,
        archive: Option<&Path>,
        snapshot_dir: Option<&Path>,
        format: &str,
        out: &mut dyn Write,
    ) -> Result<(), ApiError> {
        let format = parse_report_format(format)?;
        let stats = match snapshot_dir {
            Some(dir) => IndexStats::from_index(&SnapshotIndex::open(dir)?),
            None => {
                let archive_path =
                    path::absolutize(archive.unwrap_or(&self.config.storage.archive))?;
                let staged = StagedSnapshot::extract(
                    &TarGzArchive::default(),
                    &archive_path,
                    self.config.storage.staging_dir.as_deref(),
                )?;
                IndexStats::from_index(&SnapshotIndex::open(staged.root())?)
            }
        };

        let rendered = match format {
            ReportFormat::Text => format_index_table(&stats),
            ReportFormat::Json => format_index_json(&stats)?,
        };
        writeln!(out, "{}", rendered).map_err(output_err)
    }
}

/// Absolute scan root; a missing root would otherwise walk as an empty tree
fn scan_root(scan: &ScanConfig) -> Result<PathBuf, ApiError> {
    let root = path::absolutize(&scan.root)?;
    if !root.is_dir() {
        return Err(ApiError::RootNotFound(root));
    }
    Ok(root)
}

/// Refuse to build into a directory that already holds files, unless forced.
/// Leftover entries would be indexed as part of the new snapshot.
fn prepare_snapshot_dir(dir: &Path, force: bool) -> Result<(), ApiError> {
    if !dir.exists() {
        return Ok(());
    }
    let occupied = fs::read_dir(dir)
        .map_err(|e| StorageError::io(dir, e))?
        .next()
        .is_some();
    if !occupied {
        return Ok(());
    }
    if !force {
        return Err(ApiError::SnapshotDirOccupied(dir.to_path_buf()));
    }
    info!(dir = %dir.display(), "Removing existing snapshot directory");
    fs::remove_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
    Ok(())
}
