//! Baseline CLI Binary
//!
//! Command-line interface for building filesystem snapshots and reporting drift against them.

use baseline::cli::{map_error, Cli, RunContext};
use baseline::config::ConfigLoader;
use baseline::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::io::IsTerminal;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Baseline CLI starting");

    let context = match RunContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };
    let color = !cli.no_color && logging_config.color && std::io::stdout().is_terminal();
    let context = context.with_color(color);

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    match context.execute(&cli.command, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(()) => info!("Command completed successfully"),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and the config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let loaded = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path).ok(),
        None => std::env::current_dir()
            .ok()
            .and_then(|cwd| ConfigLoader::load(&cwd).ok()),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }
    if cli.no_color {
        config.color = false;
    }

    config
}
