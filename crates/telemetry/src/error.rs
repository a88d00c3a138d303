//! Error types for the Ignite telemetry crate.

use thiserror::Error;

/// Top-level error type for telemetry operations.
///
/// These never cross the public recorder/controller surface — precondition,
/// transport, and persistence failures are logged and swallowed there. The
/// type exists for the seams where a failure is meaningful: sink attempts
/// and queue storage.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

/// A convenience Result alias that defaults to [`TelemetryError`].
pub type Result<T> = std::result::Result<T, TelemetryError>;
