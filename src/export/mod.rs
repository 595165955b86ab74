//! Bulk export of parts across a whole category tree.
//!
//! [`ExportOrchestrator`] walks the groups of a category tree one at a time.
//! For each group it fetches manufacturers, keeps those matching the configured
//! name prefixes, fetches the parts of their brands, and appends the extracted
//! rows. A failing group is logged and skipped; an expired session aborts the
//! run. When the loop ends the rows are rendered to CSV and handed to the
//! [`ProgressSink`].
//!
//! Only one run is active per orchestrator. The orchestrator is cheap to clone;
//! every clone controls the same run.

mod csv;
mod progress;
mod run;


pub use self::csv::{ExportArtifact, export_filename, to_csv};
pub use progress::{BroadcastSink, ExportEvent, ExportProgress, LogEntry, LogLevel, ProgressSink};
pub use run::{ExportResult, ExportStatus};

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use self::run::ExportRun;
use crate::catalog::{extract_groups, filter_manufacturers};
use crate::client::CatalogSource;
use crate::config::ExportConfig;
use crate::error::{Error, FetchStage, PreconditionError, Result};
use crate::session::{Session, SessionContext};
use crate::types::{CatalogGroup, CatalogScope, CategoryTree, Ccl, ExtractedPartRow};

/// What `start` needs from the rest of the application
#[derive(Clone, Copy, Debug)]
pub struct ExportPrerequisites<'a> {
    /// The current session (token and decoded vehicle)
    pub session: &'a Session,
    /// The loaded category tree, if any
    pub category_tree: Option<&'a CategoryTree>,
}

/// Handle to a spawned export loop
#[derive(Debug)]
pub struct ExportHandle {
    task: JoinHandle<ExportResult>,
}

impl ExportHandle {
    /// Wait for the loop to finish and return its result
    pub async fn wait(self) -> Result<ExportResult> {
        self.task
            .await
            .map_err(|e| Error::Other(format!("export task failed: {}", e)))
    }
}

/// How the group loop ended
enum Outcome {
    Completed,
    Stopped,
    Failed(String),
}

/// Drives the sequential per-group export pipeline
#[derive(Clone)]
pub struct ExportOrchestrator {
    source: Arc<dyn CatalogSource>,
    sink: Arc<dyn ProgressSink>,
    config: Arc<ExportConfig>,
    run: Arc<RwLock<ExportRun>>,
}

impl std::fmt::Debug for ExportOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExportOrchestrator {
    /// Create an orchestrator with no run
    pub fn new(
        source: Arc<dyn CatalogSource>,
        sink: Arc<dyn ProgressSink>,
        config: ExportConfig,
    ) -> Self {
        Self {
            source,
            sink,
            config: Arc::new(config),
            run: Arc::new(RwLock::new(ExportRun::default())),
        }
    }

    /// Start a new run and spawn its group loop
    ///
    /// # Errors
    ///
    /// - [`PreconditionError::AlreadyRunning`] while a run is active; that run is untouched
    /// - [`PreconditionError::MissingSession`], [`PreconditionError::MissingVehicleConfig`],
    ///   or [`PreconditionError::MissingCategoryTree`] for a missing prerequisite
    /// - [`Error::InvalidTree`] when the tree holds no groups; the run is then `Failed`
    pub async fn start(&self, prerequisites: ExportPrerequisites<'_>) -> Result<ExportHandle> {
        let mut run = self.run.write().await;

        if run.status.is_active() {
            return Err(PreconditionError::AlreadyRunning.into());
        }
        let session = prerequisites.session.context()?;
        let tree = prerequisites
            .category_tree
            .ok_or(PreconditionError::MissingCategoryTree)?;

        run.reset();
        self.log(LogLevel::Info, "Starting automated export...");

        let groups = match extract_groups(tree) {
            Ok(groups) => groups,
            Err(e) => {
                run.status = ExportStatus::Failed;
                self.log(LogLevel::Error, format!("Export failed: {}", e));
                return Err(e);
            }
        };

        let total = groups.len();
        self.log(
            LogLevel::Info,
            format!("Found {} group(s) to process", total),
        );
        self.sink.progress(&ExportProgress {
            total,
            ..Default::default()
        });

        let token = CancellationToken::new();
        run.groups = groups.clone();
        run.status = ExportStatus::Running;
        run.cancel = Some(token.clone());
        drop(run);

        let this = self.clone();
        let task = tokio::spawn(async move { this.run_groups(session, groups, token).await });
        Ok(ExportHandle { task })
    }

    /// Ask the running loop to stop at the next group boundary
    ///
    /// In-flight requests are allowed to finish and the group they belong to
    /// is completed; no further group is started. Does nothing unless a run is
    /// `Running`.
    pub async fn stop(&self) {
        let mut run = self.run.write().await;
        if run.status != ExportStatus::Running {
            return;
        }
        run.status = ExportStatus::Stopping;
        if let Some(token) = &run.cancel {
            token.cancel();
        }
        drop(run);
        self.log(LogLevel::Warning, "Stopping export...");
    }

    /// Current lifecycle state
    pub async fn status(&self) -> ExportStatus {
        self.run.read().await.status
    }

    /// Position and row count of the current run
    pub async fn progress(&self) -> ExportProgress {
        let run = self.run.read().await;
        let current = if run.status == ExportStatus::Idle {
            0
        } else {
            (run.current_index + 1).min(run.groups.len())
        };
        ExportProgress {
            current,
            total: run.groups.len(),
            group_name: run
                .groups
                .get(run.current_index)
                .map(|g| g.group_name.clone())
                .unwrap_or_default(),
            rows_so_far: run.rows.len(),
        }
    }

    /// Result of the finished run
    ///
    /// # Errors
    ///
    /// [`PreconditionError::ResultUnavailable`] unless the run is `Stopped`,
    /// `Completed`, or `Failed`.
    pub async fn result(&self) -> Result<ExportResult> {
        let run = self.run.read().await;
        if !run.status.is_finished() {
            return Err(PreconditionError::ResultUnavailable { status: run.status }.into());
        }
        Ok(run.to_result())
    }

    /// Drop the finished run and return to `Idle`
    ///
    /// # Errors
    ///
    /// [`PreconditionError::AlreadyRunning`] while a run is active.
    pub async fn reset(&self) -> Result<()> {
        let mut run = self.run.write().await;
        if run.status.is_active() {
            return Err(PreconditionError::AlreadyRunning.into());
        }
        run.reset();
        Ok(())
    }

    async fn run_groups(
        self,
        session: SessionContext,
        groups: Vec<CatalogGroup>,
        token: CancellationToken,
    ) -> ExportResult {
        let total = groups.len();
        let mut outcome = Outcome::Completed;

        for (index, group) in groups.iter().enumerate() {
            let rows_so_far = {
                let mut run = self.run.write().await;
                run.current_index = index;
                run.rows.len()
            };
            self.sink.progress(&ExportProgress {
                current: index + 1,
                total,
                group_name: group.group_name.clone(),
                rows_so_far,
            });
            self.log(
                LogLevel::Info,
                format!(
                    "Processing group: {} (ID: {})",
                    group.group_name, group.group_id
                ),
            );

            if token.is_cancelled() {
                self.log(LogLevel::Warning, "Export stopped by user");
                outcome = Outcome::Stopped;
                break;
            }

            match self.process_group(&session, group).await {
                Ok(rows) => {
                    let mut run = self.run.write().await;
                    if !rows.is_empty() {
                        run.rows.extend(rows);
                        let rows_so_far = run.rows.len();
                        self.sink.progress(&ExportProgress {
                            current: index + 1,
                            total,
                            group_name: group.group_name.clone(),
                            rows_so_far,
                        });
                    }
                    run.groups_processed += 1;
                }
                Err(Error::SessionExpired) => {
                    self.sink.session_expired();
                    self.log(
                        LogLevel::Error,
                        format!(
                            "Session expired while processing group {}, please login again",
                            group.group_name
                        ),
                    );
                    outcome = Outcome::Failed(Error::SessionExpired.to_string());
                    break;
                }
                Err(e) => {
                    self.log(
                        LogLevel::Error,
                        format!("Error processing group {}: {}", group.group_name, e),
                    );
                    self.run.write().await.groups_processed += 1;
                }
            }

            if index + 1 < total {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(self.config.group_delay) => {}
                }
            }
        }

        self.finish(outcome).await
    }

    /// One group's pipeline: manufacturers, prefix filter, parts, rows
    ///
    /// Nothing is written to the run here, so an abandoned group leaves no rows.
    async fn process_group(
        &self,
        session: &SessionContext,
        group: &CatalogGroup,
    ) -> Result<Vec<ExtractedPartRow>> {
        let scope = CatalogScope::for_group(group.group_id);

        let manufacturers = self
            .source
            .manufacturers(session, &scope)
            .await
            .map_err(|e| e.for_group(group.group_id, FetchStage::Manufacturers))?;
        if manufacturers.is_empty() {
            self.log(
                LogLevel::Info,
                format!("No manufacturers for group {}", group.group_name),
            );
            return Ok(Vec::new());
        }

        let filtered = filter_manufacturers(&manufacturers, &self.config.manufacturer_prefixes);
        let Some(ccl) = Ccl::from_selections(filtered.selections) else {
            self.log(
                LogLevel::Info,
                format!("No matching manufacturers for group {}", group.group_name),
            );
            return Ok(Vec::new());
        };
        debug!(
            group_id = group.group_id,
            matched = filtered.matched.len(),
            brands = ccl.ccl_details.len(),
            "manufacturers filtered"
        );

        let parts = self
            .source
            .part_fitments(session, &scope, &ccl)
            .await
            .map_err(|e| e.for_group(group.group_id, FetchStage::Parts))?;
        if parts.is_empty() {
            self.log(
                LogLevel::Info,
                format!("No parts for group {}", group.group_name),
            );
            return Ok(Vec::new());
        }

        let rows: Vec<ExtractedPartRow> = parts.iter().map(ExtractedPartRow::from).collect();
        self.log(
            LogLevel::Info,
            format!("Found {} part(s) in group {}", rows.len(), group.group_name),
        );
        Ok(rows)
    }

    /// Record the final state, log the summary, and deliver the CSV
    async fn finish(&self, outcome: Outcome) -> ExportResult {
        let result = {
            let mut run = self.run.write().await;
            run.status = match &outcome {
                Outcome::Completed => {
                    run.current_index = run.groups.len();
                    ExportStatus::Completed
                }
                Outcome::Stopped => ExportStatus::Stopped,
                Outcome::Failed(_) => ExportStatus::Failed,
            };
            run.cancel = None;
            run.to_result()
        };

        let collected = result.rows.len();
        match &outcome {
            Outcome::Completed => self.log(
                LogLevel::Info,
                format!(
                    "Export complete! Collected {} part(s) from {} group(s).",
                    collected, result.groups_total
                ),
            ),
            Outcome::Stopped => self.log(
                LogLevel::Warning,
                format!("Export stopped. Collected {} part(s) so far.", collected),
            ),
            Outcome::Failed(reason) => self.log(
                LogLevel::Error,
                format!(
                    "Export failed: {}. Collected {} part(s) before the failure.",
                    reason, collected
                ),
            ),
        }

        match ExportArtifact::from_rows(&result.rows, Utc::now()) {
            Ok(Some(artifact)) => {
                self.log(
                    LogLevel::Info,
                    format!("CSV file ready: {}", artifact.filename),
                );
                self.sink.export_ready(&artifact);
            }
            Ok(None) => self.log(
                LogLevel::Warning,
                "No parts collected. CSV file not generated.",
            ),
            Err(e) => self.log(LogLevel::Error, format!("Failed to render CSV: {}", e)),
        }

        result
    }

    /// Send a log line to the sink and mirror it to tracing
    fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        match level {
            LogLevel::Info => info!(target: "catalog_export::export", "{}", entry.message),
            LogLevel::Warning => warn!(target: "catalog_export::export", "{}", entry.message),
            LogLevel::Error => error!(target: "catalog_export::export", "{}", entry.message),
        }
        self.sink.log(&entry);
    }
}
