//! Telemetry data models — the session report and its wire payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One free-form metric observation. `raw_metrics` is a time series, not a
/// map: duplicate keys are allowed and order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawMetric {
    pub key: String,
    pub value: String,
}

/// One scored interaction (e.g. one question) within a level.
///
/// `successful` is computed once at creation as exact string equality of
/// `correct_choice` and `choice_made`; it is never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: String,
    pub question: String,
    pub correct_choice: String,
    pub choice_made: String,
    pub successful: bool,
    pub time_taken_ms: u64,
    pub xp_earned: i64,
}

impl TaskRecord {
    /// Build a task record, deriving `successful` from the two choices.
    pub fn new(
        task_id: &str,
        question: &str,
        correct_choice: &str,
        choice_made: &str,
        time_taken_ms: u64,
        xp_earned: i64,
    ) -> Self {
        Self {
            task_id: task_id.to_string(),
            question: question.to_string(),
            correct_choice: correct_choice.to_string(),
            choice_made: choice_made.to_string(),
            successful: correct_choice == choice_made,
            time_taken_ms,
            xp_earned,
        }
    }
}

/// One level attempt. Created by `start_level` with default fields; the
/// outcome fields are overwritten by `end_level`. Level ids are not unique:
/// retries of the same level create multiple records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    pub level_id: String,
    pub successful: bool,
    pub time_taken_ms: u64,
    pub xp_earned: i64,
    pub tasks: Vec<TaskRecord>,
}

impl LevelRecord {
    /// A freshly started, not-yet-ended level attempt.
    pub fn new(level_id: &str) -> Self {
        Self {
            level_id: level_id.to_string(),
            successful: false,
            time_taken_ms: 0,
            xp_earned: 0,
            tasks: Vec::new(),
        }
    }
}

/// The mutable record of one play session.
///
/// Exclusively owned by [`crate::SessionRecorder`]; snapshots handed out of
/// the recorder are structural clones, never aliases. `session_id` and
/// `timestamp` are only present when the host assigned them — otherwise they
/// are generated at payload-build time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub game_id: String,
    pub session_name: String,
    pub xp_earned_total: i64,
    pub raw_metrics: Vec<RawMetric>,
    pub levels: Vec<LevelRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SessionReport {
    /// Number of levels that ended successfully.
    pub fn completed_levels(&self) -> usize {
        self.levels.iter().filter(|l| l.successful).count()
    }
}

/// The canonical payload delivered to host transports.
///
/// Every field is present at submit time: the identity fields are generated
/// when the report carries none, and the XP aliases all default to
/// `xp_earned_total`. Compatibility with receivers is by field presence;
/// there is no versioning header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub game_id: String,
    pub session_name: String,
    pub xp_earned_total: i64,
    pub xp_earned: i64,
    pub xp_total: i64,
    pub best_xp: i64,
    pub raw_metrics: Vec<RawMetric>,
    pub levels: Vec<LevelRecord>,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionPayload {
    /// Build the canonical payload from a report snapshot.
    ///
    /// Generates a session id (UUID v4) and a timestamp only if the report
    /// does not already carry them.
    pub fn from_report(report: SessionReport) -> Self {
        let session_id = report
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let timestamp = report.timestamp.unwrap_or_else(Utc::now);

        Self {
            game_id: report.game_id,
            session_name: report.session_name,
            xp_earned_total: report.xp_earned_total,
            xp_earned: report.xp_earned_total,
            xp_total: report.xp_earned_total,
            best_xp: report.xp_earned_total,
            raw_metrics: report.raw_metrics,
            levels: report.levels,
            session_id,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_successful_on_exact_match() {
        let task = TaskRecord::new("q1", "What is 2+2?", "4", "4", 1000, 10);
        assert!(task.successful);
    }

    #[test]
    fn task_unsuccessful_on_mismatch() {
        let task = TaskRecord::new("q1", "What is 2+2?", "4", "5", 1000, 10);
        assert!(!task.successful);
    }

    #[test]
    fn task_equality_is_exact_not_normalized() {
        // No trimming, no case folding.
        let task = TaskRecord::new("q1", "Q", "four", "Four", 0, 0);
        assert!(!task.successful);
        let task = TaskRecord::new("q1", "Q", "4", " 4", 0, 0);
        assert!(!task.successful);
    }

    #[test]
    fn level_starts_with_defaults() {
        let level = LevelRecord::new("level_1");
        assert_eq!(level.level_id, "level_1");
        assert!(!level.successful);
        assert_eq!(level.time_taken_ms, 0);
        assert_eq!(level.xp_earned, 0);
        assert!(level.tasks.is_empty());
    }

    #[test]
    fn payload_generates_session_id_and_timestamp() {
        let payload = SessionPayload::from_report(SessionReport::default());
        assert!(!payload.session_id.is_empty());
        // Two payloads from the same blank report get distinct ids.
        let other = SessionPayload::from_report(SessionReport::default());
        assert_ne!(payload.session_id, other.session_id);
    }

    #[test]
    fn payload_keeps_host_assigned_identity() {
        let report = SessionReport {
            session_id: Some("host-7".into()),
            timestamp: Some(
                DateTime::parse_from_rfc3339("2026-01-15T12:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            ..SessionReport::default()
        };
        let payload = SessionPayload::from_report(report);
        assert_eq!(payload.session_id, "host-7");
        assert_eq!(payload.timestamp.to_rfc3339(), "2026-01-15T12:00:00+00:00");
    }

    #[test]
    fn payload_xp_aliases_default_to_total() {
        let report = SessionReport {
            xp_earned_total: 250,
            ..SessionReport::default()
        };
        let payload = SessionPayload::from_report(report);
        assert_eq!(payload.xp_earned, 250);
        assert_eq!(payload.xp_total, 250);
        assert_eq!(payload.best_xp, 250);
    }

    #[test]
    fn payload_serializes_with_wire_field_names() {
        let report = SessionReport {
            game_id: "crossword_puzzle".into(),
            session_name: "s1".into(),
            xp_earned_total: 200,
            raw_metrics: vec![RawMetric {
                key: "fps".into(),
                value: "60".into(),
            }],
            levels: vec![LevelRecord {
                level_id: "level_demo".into(),
                successful: true,
                time_taken_ms: 90_000,
                xp_earned: 200,
                tasks: vec![TaskRecord::new(
                    "check_attempt_1",
                    "Check Attempt #1",
                    "all_filled",
                    "all_filled",
                    2000,
                    0,
                )],
            }],
            session_id: None,
            timestamp: None,
        };

        let json = serde_json::to_string(&SessionPayload::from_report(report)).unwrap();
        assert!(json.contains("\"gameId\":\"crossword_puzzle\""));
        assert!(json.contains("\"sessionName\":\"s1\""));
        assert!(json.contains("\"xpEarnedTotal\":200"));
        assert!(json.contains("\"xpEarned\":200"));
        assert!(json.contains("\"xpTotal\":200"));
        assert!(json.contains("\"bestXp\":200"));
        assert!(json.contains("\"rawMetrics\":[{\"key\":\"fps\",\"value\":\"60\"}]"));
        assert!(json.contains("\"levelId\":\"level_demo\""));
        assert!(json.contains("\"timeTakenMs\":90000"));
        assert!(json.contains("\"taskId\":\"check_attempt_1\""));
        assert!(json.contains("\"correctChoice\":\"all_filled\""));
        assert!(json.contains("\"choiceMade\":\"all_filled\""));
        assert!(json.contains("\"sessionId\":"));
        assert!(json.contains("\"timestamp\":"));
    }

    #[test]
    fn payload_roundtrip_serde() {
        let report = SessionReport {
            game_id: "g".into(),
            session_name: "s".into(),
            xp_earned_total: 10,
            raw_metrics: vec![],
            levels: vec![LevelRecord::new("L1")],
            session_id: Some("sid".into()),
            timestamp: Some(Utc::now()),
        };
        let payload = SessionPayload::from_report(report);
        let json = serde_json::to_string(&payload).unwrap();
        let back: SessionPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload, back);
    }

    #[test]
    fn completed_levels_counts_successful_only() {
        let mut report = SessionReport::default();
        report.levels.push(LevelRecord::new("L1"));
        report.levels.push(LevelRecord {
            successful: true,
            ..LevelRecord::new("L2")
        });
        assert_eq!(report.completed_levels(), 1);
    }
}
