//! Environment source: BASELINE_SCAN__SIZE_THRESHOLD=4096 and friends.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

/// Add `BASELINE_*` environment variables. Nested keys use `__`;
/// `BASELINE_SCAN__EXCLUDED_PATHS` is a comma-separated list.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("BASELINE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("scan.excluded_paths"),
    )
}
