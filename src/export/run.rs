//! The export run aggregate and its lifecycle states.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::types::{CatalogGroup, ExtractedPartRow};

/// Lifecycle state of an export run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// No run has started, or the last one was reset
    #[default]
    Idle,
    /// The group loop is running
    Running,
    /// A stop was requested but the loop has not observed it yet
    Stopping,
    /// The loop observed a stop request and exited early
    Stopped,
    /// Every group was visited
    Completed,
    /// The run aborted (malformed tree, expired session)
    Failed,
}

impl ExportStatus {
    /// Whether the group loop is still alive
    pub fn is_active(self) -> bool {
        matches!(self, ExportStatus::Running | ExportStatus::Stopping)
    }

    /// Whether the run reached a final state; its rows no longer change
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            ExportStatus::Stopped | ExportStatus::Completed | ExportStatus::Failed
        )
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportStatus::Idle => "idle",
            ExportStatus::Running => "running",
            ExportStatus::Stopping => "stopping",
            ExportStatus::Stopped => "stopped",
            ExportStatus::Completed => "completed",
            ExportStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// State of one export run, owned by the orchestrator
///
/// `current_index` stays within `0..=groups.len()`; `rows` only grows while the
/// run is active.
#[derive(Debug, Default)]
pub(crate) struct ExportRun {
    pub(crate) status: ExportStatus,
    pub(crate) groups: Vec<CatalogGroup>,
    pub(crate) current_index: usize,
    pub(crate) groups_processed: usize,
    pub(crate) rows: Vec<ExtractedPartRow>,
    pub(crate) cancel: Option<CancellationToken>,
}

impl ExportRun {
    /// Return to a fresh aggregate for a new run
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn to_result(&self) -> ExportResult {
        ExportResult {
            status: self.status,
            rows: self.rows.clone(),
            groups_processed: self.groups_processed,
            groups_total: self.groups.len(),
        }
    }
}

/// Outcome of a finished export run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// Final state: stopped, completed, or failed
    pub status: ExportStatus,
    /// Rows in group-visit order, parts within a group in API order
    pub rows: Vec<ExtractedPartRow>,
    /// Groups whose pipeline ran to the end (failed fetches included)
    pub groups_processed: usize,
    /// Size of the work list
    pub groups_total: usize,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(ExportStatus::Running.is_active());
        assert!(ExportStatus::Stopping.is_active());
        assert!(!ExportStatus::Idle.is_active());

        for status in [
            ExportStatus::Stopped,
            ExportStatus::Completed,
            ExportStatus::Failed,
        ] {
            assert!(status.is_finished());
            assert!(!status.is_active());
        }
        assert!(!ExportStatus::Idle.is_finished());
    }

    #[test]
    fn test_status_display_and_serde_agree() {
        let json = serde_json::to_string(&ExportStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!(ExportStatus::Stopping.to_string(), "stopping");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut run = ExportRun {
            status: ExportStatus::Completed,
            current_index: 2,
            groups_processed: 2,
            rows: vec![ExtractedPartRow::default()],
            ..Default::default()
        };
        run.reset();
        assert_eq!(run.status, ExportStatus::Idle);
        assert!(run.rows.is_empty());
        assert!(run.groups.is_empty());
        assert_eq!(run.current_index, 0);
        assert_eq!(run.groups_processed, 0);
        assert!(run.cancel.is_none());
    }
}
