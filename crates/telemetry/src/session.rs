//! Session lifecycle — orchestrates record, submit, and queued retry.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::TelemetryConfig;
use crate::dispatch::TransportDispatcher;
use crate::error::Result;
use crate::models::{SessionPayload, SessionReport};
use crate::queue::DeliveryQueue;
use crate::recorder::SessionRecorder;
use crate::sink::{CallbackSink, ParentChannelSink, ShellChannelSink, Sink, TargetOrigin};

/// Handshake message type that supplies a parent-channel target origin.
const HANDSHAKE_TYPE: &str = "ANALYTICS_CONFIG";

/// Lifecycle state of one session.
///
/// `Submitted` guards nothing: each submit re-sends the then-current
/// snapshot, which supports abandon reporting after an earlier attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active,
    Submitted,
}

/// Orchestrates one telemetry session end to end.
///
/// Owns the recorder, the transport dispatcher, and the delivery queue.
/// The host constructs exactly one controller, registers its available
/// channels, and wires its environment signals to the `on_*` methods once
/// at startup; all methods are fail-soft.
///
/// Single-threaded by design: sink calls complete synchronously and timers
/// are host events delivered through [`tick`](SessionController::tick), so
/// the controller never spawns threads.
pub struct SessionController {
    recorder: SessionRecorder,
    dispatcher: TransportDispatcher,
    queue: DeliveryQueue,
    target_origin: TargetOrigin,
    flush_delay: Duration,
    flush_due: Option<Instant>,
    state: SessionState,
}

impl SessionController {
    /// Build a controller from configuration. No sinks are registered yet.
    pub fn new(config: &TelemetryConfig) -> Self {
        let queue = match &config.queue.path {
            Some(path) => DeliveryQueue::new(path),
            None => DeliveryQueue::in_memory(),
        };

        Self {
            recorder: SessionRecorder::new(),
            dispatcher: TransportDispatcher::new(),
            queue,
            target_origin: TargetOrigin::new(&config.delivery.parent_origin),
            flush_delay: Duration::from_millis(config.delivery.flush_delay_ms),
            flush_due: None,
            state: SessionState::Uninitialized,
        }
    }

    // --- sink registration (priority = registration order) ---

    /// Register a locally provided host callback.
    pub fn register_host_callback(
        &mut self,
        callback: impl Fn(&SessionPayload) -> Result<()> + 'static,
    ) {
        self.dispatcher.register(Box::new(CallbackSink::new(callback)));
    }

    /// Register an embedding-shell text channel.
    pub fn register_shell_channel(&mut self, channel: impl Fn(&str) -> Result<()> + 'static) {
        self.dispatcher
            .register(Box::new(ShellChannelSink::new(channel)));
    }

    /// Register a parent-context channel. The target origin starts at the
    /// configured default and follows later handshake messages.
    pub fn register_parent_channel(
        &mut self,
        channel: impl Fn(&SessionPayload, &str) -> Result<()> + 'static,
    ) {
        self.dispatcher.register(Box::new(ParentChannelSink::new(
            self.target_origin.clone(),
            channel,
        )));
    }

    /// Register any custom sink.
    pub fn register_sink(&mut self, sink: Box<dyn Sink>) {
        self.dispatcher.register(sink);
    }

    // --- recorder surface ---

    /// Begin a session. Idempotent; re-initializing starts over.
    pub fn initialize(&mut self, game_id: &str, session_name: &str) {
        self.recorder.initialize(game_id, session_name);
        self.state = SessionState::Active;
    }

    pub fn add_metric(&mut self, key: &str, value: impl ToString) {
        self.recorder.add_metric(key, value);
        self.mark_active();
    }

    pub fn start_level(&mut self, level_id: &str) {
        self.recorder.start_level(level_id);
        self.mark_active();
    }

    pub fn end_level(&mut self, level_id: &str, successful: bool, time_taken_ms: u64, xp: i64) {
        self.recorder.end_level(level_id, successful, time_taken_ms, xp);
        self.mark_active();
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record_task(
        &mut self,
        level_id: &str,
        task_id: &str,
        question: &str,
        correct_choice: &str,
        choice_made: &str,
        time_taken_ms: u64,
        xp: i64,
    ) {
        self.recorder.record_task(
            level_id,
            task_id,
            question,
            correct_choice,
            choice_made,
            time_taken_ms,
            xp,
        );
        self.mark_active();
    }

    /// Deep copy of the current report, for host-side inspection.
    pub fn report_data(&self) -> SessionReport {
        self.recorder.report_data()
    }

    /// Clear recorded data and re-enter `Active` with the same identifiers.
    pub fn reset(&mut self) {
        self.recorder.reset();
        self.mark_active();
    }

    // --- lifecycle ---

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of reports waiting in the delivery queue.
    pub fn pending_reports(&self) -> usize {
        self.queue.pending_count()
    }

    /// Snapshot the report, build the canonical payload, and hand it to the
    /// transports. Enqueues the payload when no sink accepts it, and
    /// schedules the delayed catch-up flush.
    ///
    /// Returns the payload that was sent, or `None` before `initialize`.
    pub fn submit(&mut self) -> Option<SessionPayload> {
        if !self.recorder.is_initialized() {
            warn!("submit before initialize, dropped");
            return None;
        }

        let report = self.recorder.report_data();
        let completed = report.completed_levels();
        let payload = SessionPayload::from_report(report);

        info!(
            game_id = %payload.game_id,
            session = %payload.session_name,
            total_xp = payload.xp_earned_total,
            completed_levels = completed,
            metrics = payload.raw_metrics.len(),
            "session report submitted"
        );

        if !self.dispatcher.dispatch(&payload) {
            self.queue.enqueue(payload.clone());
        }

        self.flush_due = Some(Instant::now() + self.flush_delay);
        self.state = SessionState::Submitted;
        Some(payload)
    }

    // --- environment signals, wired once by the host at startup ---

    /// Connectivity came back: retry everything held in the queue.
    pub fn on_connectivity_restored(&mut self) {
        debug!("connectivity restored, flushing queue");
        self.queue.flush_all(&self.dispatcher);
    }

    /// The environment finished loading: retry everything held in the queue.
    pub fn on_environment_ready(&mut self) {
        debug!("environment ready, flushing queue");
        self.queue.flush_all(&self.dispatcher);
    }

    /// Host timer pump. Runs the delayed post-submit flush once due. The
    /// flush is lost if the process exits first; the queue file is the
    /// durability backstop, not this timer.
    pub fn tick(&mut self, now: Instant) {
        if self.flush_due.is_some_and(|due| now >= due) {
            self.flush_due = None;
            debug!("post-submit delay elapsed, flushing queue");
            self.queue.flush_all(&self.dispatcher);
        }
    }

    /// The session is being torn down: best-effort final submission.
    pub fn on_unload(&mut self) {
        if self.recorder.is_initialized() {
            self.submit();
        }
    }

    /// Inbound host message. Recognizes the analytics-config handshake and
    /// narrows the parent-channel target origin; anything else is ignored.
    pub fn on_host_message(&mut self, raw: &str) {
        let Ok(message) = serde_json::from_str::<HandshakeMessage>(raw) else {
            debug!("ignoring unrecognized host message");
            return;
        };
        if message.kind == HANDSHAKE_TYPE {
            if let Some(origin) = message.parent_origin {
                info!(origin = %origin, "parent origin set by handshake");
                self.target_origin.set(&origin);
            }
        }
    }

    fn mark_active(&mut self) {
        if self.recorder.is_initialized() {
            self.state = SessionState::Active;
        }
    }
}

#[derive(Debug, Deserialize)]
struct HandshakeMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "parentOrigin")]
    parent_origin: Option<String>,
}
