//! Local config file source: baseline.toml and baseline.{env}.toml in a directory

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Add local config files to builder.
/// Precedence: baseline.toml (base) then baseline.{BASELINE_ENV}.toml (env-specific).
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder;

    let base_config_path = dir.join("baseline.toml");
    if base_config_path.is_file() {
        builder = builder.add_source(File::from(base_config_path).format(FileFormat::Toml));
    }

    if let Ok(env_name) = std::env::var("BASELINE_ENV") {
        let env_config_path = dir.join(format!("baseline.{}.toml", env_name));
        if env_config_path.is_file() {
            builder = builder.add_source(File::from(env_config_path).format(FileFormat::Toml));
        }
    }

    Ok(builder)
}
