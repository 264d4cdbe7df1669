//! Merge rules: defaults and override order.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with built-in defaults applied.
///
/// Every later source (files, environment) overrides these key by key.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("scan.root", "/")?
        .set_default("scan.size_threshold", crate::types::DEFAULT_SIZE_THRESHOLD as i64)?
        .set_default("scan.max_path_len", crate::types::DEFAULT_MAX_PATH_LEN as i64)?
        .set_default(
            "scan.excluded_paths",
            crate::tree::filter::SYSTEM_EXCLUDED_PATHS.to_vec(),
        )?
        .set_default("storage.snapshot_dir", "./baseline")?
        .set_default("storage.archive", "baseline.tar.gz")
}
