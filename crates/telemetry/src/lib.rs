//! Ignite Telemetry — single-session gameplay telemetry.
//!
//! Collects level, task, and free-form metrics for one play session into a
//! canonical report and delivers it, best effort, to whichever host
//! transports are available, with a durable local queue as the fallback.
//! Nothing in this crate can fail fatally: losing telemetry must never
//! interrupt gameplay.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod queue;
pub mod recorder;
pub mod session;
pub mod sink;

pub use config::TelemetryConfig;
pub use dispatch::TransportDispatcher;
pub use error::{Result, TelemetryError};
pub use models::{LevelRecord, RawMetric, SessionPayload, SessionReport, TaskRecord};
pub use queue::DeliveryQueue;
pub use recorder::SessionRecorder;
pub use session::{SessionController, SessionState};
pub use sink::{CallbackSink, ParentChannelSink, ShellChannelSink, Sink, TargetOrigin};
