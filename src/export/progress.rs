//! Progress reporting to the embedding UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::csv::ExportArtifact;

/// Position of the loop within the work list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    /// 1-based index of the group being processed (0 before the first)
    pub current: usize,
    /// Number of groups in the run
    pub total: usize,
    /// Name of the group being processed
    pub group_name: String,
    /// Rows collected so far
    pub rows_so_far: usize,
}

/// Severity of a user-facing log line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Normal progress
    Info,
    /// Something was skipped or stopped
    Warning,
    /// A fetch or the run failed
    Error,
}

/// A timestamped log line for the export log panel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the line was produced
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub level: LogLevel,
    /// Human-readable text
    pub message: String,
}

impl LogEntry {
    /// A log line stamped with the current time
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// Receiver of everything an export run reports
///
/// Implementations are called from the export task and must not block.
pub trait ProgressSink: Send + Sync {
    /// Position update, sent at every group and after rows were added
    fn progress(&self, progress: &ExportProgress);

    /// A user-facing log line
    fn log(&self, entry: &LogEntry);

    /// The remote API rejected the session; the user must log in again
    fn session_expired(&self) {}

    /// The CSV of a finished run that collected at least one row
    fn export_ready(&self, _artifact: &ExportArtifact) {}
}

/// Everything a [`ProgressSink`] can receive, as one serializable event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportEvent {
    /// Position update
    Progress(ExportProgress),
    /// Log line
    Log(LogEntry),
    /// The session must be renewed
    SessionExpired,
    /// A CSV is ready for download
    ExportReady(ExportArtifact),
}

/// A [`ProgressSink`] that fans events out over a broadcast channel
///
/// Subscribers that fall behind lose the oldest events; sending with no
/// subscriber is not an error.
#[derive(Clone, Debug)]
pub struct BroadcastSink {
    tx: broadcast::Sender<ExportEvent>,
}

impl BroadcastSink {
    /// Create a sink whose channel buffers `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Receive every event sent from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ExportEvent> {
        self.tx.subscribe()
    }

    fn send(&self, event: ExportEvent) {
        // no subscribers is fine
        let _ = self.tx.send(event);
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl ProgressSink for BroadcastSink {
    fn progress(&self, progress: &ExportProgress) {
        self.send(ExportEvent::Progress(progress.clone()));
    }

    fn log(&self, entry: &LogEntry) {
        self.send(ExportEvent::Log(entry.clone()));
    }

    fn session_expired(&self) {
        self.send(ExportEvent::SessionExpired);
    }

    fn export_ready(&self, artifact: &ExportArtifact) {
        self.send(ExportEvent::ExportReady(artifact.clone()));
    }
}
