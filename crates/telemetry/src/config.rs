//! TOML-based configuration for the telemetry subsystem.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelemetryError};

/// Top-level telemetry configuration, deserialized from a TOML file.
///
/// Every field has a default, so an empty file (or no file at all, via
/// [`Default`]) yields a working in-memory setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Where undelivered reports are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Path of the pending-reports file. Absent means in-memory only.
    #[serde(default)]
    pub path: Option<String>,
}

/// Delivery and retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Delay before the post-submit queue flush, in milliseconds. Catches a
    /// parent context that becomes available shortly after load.
    #[serde(default = "default_flush_delay_ms")]
    pub flush_delay_ms: u64,
    /// Initial parent-channel target origin. A handshake message can narrow
    /// it later.
    #[serde(default = "default_parent_origin")]
    pub parent_origin: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            flush_delay_ms: default_flush_delay_ms(),
            parent_origin: default_parent_origin(),
        }
    }
}

fn default_flush_delay_ms() -> u64 {
    2000
}

fn default_parent_origin() -> String {
    crate::sink::ANY_ORIGIN.to_string()
}

impl TelemetryConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TelemetryError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }
}
