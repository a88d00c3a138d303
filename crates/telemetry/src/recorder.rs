//! Session recording — the stateful API that mutates one session report.

use tracing::{info, warn};

use crate::models::{LevelRecord, RawMetric, SessionReport, TaskRecord};

/// Records telemetry for one play session.
///
/// Every operation is fail-soft: calling before [`initialize`] or naming an
/// unknown level logs a warning and mutates nothing. Callers get no error
/// signal beyond the log, so losing a metric can never interrupt gameplay.
///
/// One recorder instance is one session. The "one session per process" rule
/// of the original design is caller discipline here: construct exactly one
/// and hand it to whoever records.
///
/// [`initialize`]: SessionRecorder::initialize
#[derive(Debug, Default)]
pub struct SessionRecorder {
    initialized: bool,
    report: SessionReport,
}

impl SessionRecorder {
    /// A recorder with no session. All mutations are no-ops until
    /// [`initialize`](SessionRecorder::initialize) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session, stamping the report with the given identifiers.
    ///
    /// Always succeeds and is idempotent: re-initializing intentionally
    /// discards any in-flight data from the previous session.
    pub fn initialize(&mut self, game_id: &str, session_name: &str) {
        self.report = SessionReport {
            game_id: game_id.to_string(),
            session_name: session_name.to_string(),
            ..SessionReport::default()
        };
        self.initialized = true;
        info!(game_id, session_name, "telemetry session initialized");
    }

    /// Whether [`initialize`](SessionRecorder::initialize) has been called.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Append a free-form metric. The value is stored in string form;
    /// duplicate keys accumulate as a time series.
    pub fn add_metric(&mut self, key: &str, value: impl ToString) {
        if !self.initialized {
            warn!(key, "add_metric before initialize, dropped");
            return;
        }
        self.report.raw_metrics.push(RawMetric {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Start a level attempt. Repeated starts of the same id create multiple
    /// records on purpose: retries are separate attempts, and lookups resolve
    /// to the newest one.
    pub fn start_level(&mut self, level_id: &str) {
        if !self.initialized {
            warn!(level_id, "start_level before initialize, dropped");
            return;
        }
        self.report.levels.push(LevelRecord::new(level_id));
        info!(level_id, "level started");
    }

    /// Conclude a level attempt: overwrite its outcome fields and add `xp`
    /// to the session total.
    ///
    /// Resolves `level_id` to the most recently started matching record. A
    /// second call for the same record overwrites `xp_earned` again but also
    /// adds to the total again; callers ending a level twice get a total
    /// that counts both amounts.
    pub fn end_level(&mut self, level_id: &str, successful: bool, time_taken_ms: u64, xp: i64) {
        let Some(index) = self.level_index(level_id) else {
            warn!(level_id, "end_level for unknown level, dropped");
            return;
        };

        let level = &mut self.report.levels[index];
        level.successful = successful;
        level.time_taken_ms = time_taken_ms;
        level.xp_earned = xp;
        self.report.xp_earned_total += xp;
    }

    /// Record one scored interaction within a level.
    ///
    /// Resolves `level_id` like [`end_level`](SessionRecorder::end_level);
    /// the task's `successful` flag is exact string equality of the correct
    /// choice and the choice made.
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
        let Some(index) = self.level_index(level_id) else {
            warn!(level_id, task_id, "record_task for unknown level, dropped");
            return;
        };

        self.report.levels[index].tasks.push(TaskRecord::new(
            task_id,
            question,
            correct_choice,
            choice_made,
            time_taken_ms,
            xp,
        ));
    }

    /// A deep, independent copy of the current report. Mutating the returned
    /// value never affects recorder state.
    pub fn report_data(&self) -> SessionReport {
        self.report.clone()
    }

    /// Clear all recorded data, keeping the session identifiers and the
    /// initialized flag. Any host-assigned session id or timestamp is also
    /// cleared: a reset begins a new session.
    pub fn reset(&mut self) {
        self.report.xp_earned_total = 0;
        self.report.raw_metrics.clear();
        self.report.levels.clear();
        self.report.session_id = None;
        self.report.timestamp = None;
        info!("telemetry data reset");
    }

    /// Last-match-wins lookup: scan levels newest-first so retries of the
    /// same id address the most recent attempt.
    fn level_index(&self, level_id: &str) -> Option<usize> {
        self.report
            .levels
            .iter()
            .rposition(|l| l.level_id == level_id)
    }
}
