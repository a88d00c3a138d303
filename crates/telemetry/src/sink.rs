//! Delivery sinks — the host channels a finalized report can be handed to.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;
use crate::models::SessionPayload;

/// Wildcard target origin: deliver to whatever parent context is listening.
pub const ANY_ORIGIN: &str = "*";

/// An external channel capable of accepting a finalized report.
///
/// `attempt` completing without error means the channel accepted the call,
/// not that a remote peer confirmed receipt; delivery is best effort and the
/// dispatcher treats an `Err` as "try the next sink".
pub trait Sink {
    /// Short channel name used in log lines.
    fn name(&self) -> &'static str;

    /// Hand the payload to this channel.
    fn attempt(&self, payload: &SessionPayload) -> Result<()>;
}

/// A locally registered host callback, invoked synchronously with the
/// structured payload.
pub struct CallbackSink {
    callback: Box<dyn Fn(&SessionPayload) -> Result<()>>,
}

impl CallbackSink {
    pub fn new(callback: impl Fn(&SessionPayload) -> Result<()> + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl Sink for CallbackSink {
    fn name(&self) -> &'static str {
        "host_callback"
    }

    fn attempt(&self, payload: &SessionPayload) -> Result<()> {
        (self.callback)(payload)
    }
}

/// An embedding-shell message channel. The payload is serialized to JSON
/// text before hand-off; the shell side only speaks strings.
pub struct ShellChannelSink {
    channel: Box<dyn Fn(&str) -> Result<()>>,
}

impl ShellChannelSink {
    pub fn new(channel: impl Fn(&str) -> Result<()> + 'static) -> Self {
        Self {
            channel: Box::new(channel),
        }
    }
}

impl Sink for ShellChannelSink {
    fn name(&self) -> &'static str {
        "shell_channel"
    }

    fn attempt(&self, payload: &SessionPayload) -> Result<()> {
        let text = serde_json::to_string(payload)?;
        (self.channel)(&text)
    }
}

/// A parent-context message channel, addressed to a target origin.
///
/// The origin defaults to [`ANY_ORIGIN`] until a handshake message supplies
/// a specific one; the shared [`TargetOrigin`] handle lets the session
/// controller update it after the sink is registered.
pub struct ParentChannelSink {
    channel: Box<dyn Fn(&SessionPayload, &str) -> Result<()>>,
    target_origin: TargetOrigin,
}

impl ParentChannelSink {
    pub fn new(
        target_origin: TargetOrigin,
        channel: impl Fn(&SessionPayload, &str) -> Result<()> + 'static,
    ) -> Self {
        Self {
            channel: Box::new(channel),
            target_origin,
        }
    }
}

impl Sink for ParentChannelSink {
    fn name(&self) -> &'static str {
        "parent_channel"
    }

    fn attempt(&self, payload: &SessionPayload) -> Result<()> {
        let origin = self.target_origin.get();
        (self.channel)(payload, &origin)
    }
}

/// Shared handle for the parent-channel target origin.
#[derive(Debug, Clone)]
pub struct TargetOrigin(Arc<Mutex<String>>);

impl TargetOrigin {
    pub fn new(origin: &str) -> Self {
        Self(Arc::new(Mutex::new(origin.to_string())))
    }

    pub fn set(&self, origin: &str) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = origin.to_string();
    }

    pub fn get(&self) -> String {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for TargetOrigin {
    fn default() -> Self {
        Self::new(ANY_ORIGIN)
    }
}
