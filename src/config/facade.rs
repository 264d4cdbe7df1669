//! Config loader facade: the single entry point for building a `BaselineConfig`.

use super::merge::builder_with_defaults;
use super::sources::{environment, global_file, local_file};
use super::BaselineConfig;
use crate::error::ApiError;
use config::{File, FileFormat};
use std::path::Path;

/// Loads, merges and validates configuration
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a run started in `dir`
    ///
    /// Defaults, then the global file, then `dir/baseline.toml` and
    /// `dir/baseline.{BASELINE_ENV}.toml`, then environment variables.
    pub fn load(dir: &Path) -> Result<BaselineConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = local_file::add_to_builder(builder, dir)?;
        let builder = environment::add_to_builder(builder);
        Self::finish(builder.build()?)
    }

    /// Load configuration from an explicit file, replacing the file layers.
    /// Environment variables still apply on top.
    pub fn load_from_file(path: &Path) -> Result<BaselineConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        let builder = environment::add_to_builder(builder);
        Self::finish(builder.build()?)
    }

    /// Effective configuration rendered as TOML
    pub fn render(config: &BaselineConfig) -> Result<String, ApiError> {
        toml::to_string_pretty(config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
    }

    fn finish(raw: config::Config) -> Result<BaselineConfig, ApiError> {
        let config: BaselineConfig = raw.try_deserialize()?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
