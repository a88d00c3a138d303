//! Transport dispatch — fan one report out to every available sink.

use tracing::{debug, info, warn};

use crate::models::SessionPayload;
use crate::sink::Sink;

/// Tries a prioritized list of sinks for one finalized report.
///
/// Every sink is attempted independently; a failure never prevents trying
/// the rest, and a success does not stop later sinks (each registered host
/// channel gets the report). Transport failures are swallowed and logged.
/// The dispatcher itself never errors.
#[derive(Default)]
pub struct TransportDispatcher {
    sinks: Vec<Box<dyn Sink>>,
}

impl TransportDispatcher {
    /// A dispatcher with no sinks. Dispatching through it traces the payload
    /// and reports no acceptance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sink. Registration order is priority order.
    pub fn register(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Attempt delivery of `payload` through every sink, in order.
    ///
    /// Returns `true` if at least one sink accepted the call. Acceptance
    /// means the call completed without error, not confirmed remote receipt.
    /// When nothing accepts, emits one trace line carrying the payload JSON
    /// as a diagnostic fallback.
    pub fn dispatch(&self, payload: &SessionPayload) -> bool {
        let mut accepted = false;

        for sink in &self.sinks {
            match sink.attempt(payload) {
                Ok(()) => {
                    debug!(sink = sink.name(), "report accepted");
                    accepted = true;
                }
                Err(err) => {
                    warn!(sink = sink.name(), error = %err, "sink rejected report");
                }
            }
        }

        if !accepted {
            match serde_json::to_string(payload) {
                Ok(json) => info!(payload = %json, "no transport accepted report"),
                Err(err) => warn!(error = %err, "failed to trace undelivered report"),
            }
        }

        accepted
    }
}
