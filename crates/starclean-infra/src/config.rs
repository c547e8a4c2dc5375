//! Global configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.starclean/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed, and replaces any section that fails
//! validation with its default.

use std::path::Path;

use starclean_types::config::{AvailabilityConfig, GlobalConfig, PricingConfig};

use crate::filesystem::config_path;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If a parsed pricing or availability section is invalid, logs a warning
///   and uses the default for that section only.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => sanitize(config),
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Replace invalid sections with their defaults.
pub fn sanitize(mut config: GlobalConfig) -> GlobalConfig {
    if let Err(err) = config.pricing.validate() {
        tracing::warn!("{err}, using default pricing");
        config.pricing = PricingConfig::default();
    }
    if let Err(err) = config.availability.validate() {
        tracing::warn!("{err}, using default availability");
        config.availability = AvailabilityConfig::default();
    }
    config
}
