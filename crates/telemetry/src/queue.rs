//! Delivery queue — durable holding area for reports no transport accepted.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::dispatch::TransportDispatcher;
use crate::models::SessionPayload;

/// Ordered queue of undelivered reports, persisted as a JSON array file.
///
/// The file survives process restarts; everything else degrades. A storage
/// failure on enqueue keeps the payload in an in-memory fallback for the
/// rest of the run, and unexpected file content is treated as an empty
/// queue. No queue operation returns an error.
///
/// This is a one-shot catch-up mechanism, not a retry log: a flush clears
/// attempted entries whether or not any transport accepted them.
#[derive(Debug, Default)]
pub struct DeliveryQueue {
    path: Option<PathBuf>,
    fallback: Vec<SessionPayload>,
}

impl DeliveryQueue {
    /// A queue persisted at `path`. The file is created on first enqueue.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            fallback: Vec::new(),
        }
    }

    /// A queue with no backing file. Contents last for this run only.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Where this queue persists, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a payload to the persisted sequence.
    ///
    /// On any storage failure the payload is kept in memory instead, with a
    /// warning; it is still eligible for the next flush in this run.
    pub fn enqueue(&mut self, payload: SessionPayload) {
        let Some(path) = self.path.clone() else {
            self.fallback.push(payload);
            return;
        };

        let mut pending = match read_pending(&path) {
            Ok(pending) => pending,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "queue unreadable, keeping report in memory");
                self.fallback.push(payload);
                return;
            }
        };

        pending.push(payload);
        if let Err(err) = write_pending(&path, &pending) {
            warn!(path = %path.display(), error = %err, "queue unwritable, keeping report in memory");
            // The payload is the entry we just appended.
            if let Some(payload) = pending.pop() {
                self.fallback.push(payload);
            }
            return;
        }

        debug!(path = %path.display(), pending = pending.len(), "report queued for later delivery");
    }

    /// Attempt delivery of every held report, in enqueue order, then clear.
    ///
    /// Entries are cleared even when the dispatcher reported no acceptance.
    /// A read failure aborts without clearing the file, so those entries get
    /// another chance on the next flush.
    pub fn flush_all(&mut self, dispatcher: &TransportDispatcher) {
        for payload in self.fallback.drain(..) {
            dispatcher.dispatch(&payload);
        }

        let Some(path) = self.path.clone() else {
            return;
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "queue unreadable, flush skipped");
                return;
            }
        };

        match serde_json::from_str::<Vec<SessionPayload>>(&content) {
            Ok(pending) => {
                debug!(path = %path.display(), pending = pending.len(), "flushing queued reports");
                for payload in &pending {
                    dispatcher.dispatch(payload);
                }
            }
            Err(err) => {
                // Another writer got to the file; treat it as empty.
                warn!(path = %path.display(), error = %err, "unexpected queue content, discarding");
            }
        }

        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %err, "failed to clear queue file");
            }
        }
    }

    /// Number of reports currently held, persisted plus in-memory.
    pub fn pending_count(&self) -> usize {
        let persisted = self
            .path
            .as_deref()
            .and_then(|path| read_pending(path).ok())
            .map(|pending| pending.len())
            .unwrap_or(0);
        persisted + self.fallback.len()
    }
}

/// Read the persisted sequence. A missing file or unparseable content is an
/// empty queue; only a real I/O failure is an error.
fn read_pending(path: &Path) -> std::io::Result<Vec<SessionPayload>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    match serde_json::from_str(&content) {
        Ok(pending) => Ok(pending),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unexpected queue content, treating as empty");
            Ok(Vec::new())
        }
    }
}

fn write_pending(path: &Path, pending: &[SessionPayload]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec(pending).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
