use std::path::Path;

use ignite_telemetry::TelemetryConfig;
use tracing::debug;

pub mod demo;
pub mod flush;
pub mod status;

/// Load the config file if it exists, otherwise fall back to defaults
/// (in-memory queue, wildcard parent origin).
pub fn load_config(config_path: &str) -> anyhow::Result<TelemetryConfig> {
    let path = Path::new(config_path);
    if path.exists() {
        Ok(TelemetryConfig::load(path)?)
    } else {
        debug!(config = config_path, "no config file, using defaults");
        Ok(TelemetryConfig::default())
    }
}
