//! # catalog-export
//!
//! Client library for a remote parts-catalog API, with a bulk exporter that
//! collects parts across a whole category tree into CSV.
//!
//! ## Design Philosophy
//!
//! catalog-export is designed to be:
//! - **Library-first** - No UI, the embedding application renders progress
//! - **Sensible defaults** - Every setting has a default, an empty config works
//! - **Failure-tolerant** - One failing group never aborts a bulk export
//! - **Event-driven** - Progress, log lines, and the finished CSV are pushed to a sink
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use catalog_export::{
//!     BroadcastSink, CatalogClient, Config, ExportEvent, ExportOrchestrator, ExportPrerequisites,
//!     SessionStore, Vin,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = CatalogClient::new(config.api.clone(), config.retry.clone())?;
//!
//!     let store = SessionStore::from_config(&config.session);
//!     let mut session = store.load().await;
//!     session.set_token(client.login("user", "secret").await?);
//!     let token = session.access_token.clone().unwrap_or_default();
//!     session.set_vehicle(client.decode_vin(&token, &Vin::parse("1HGCM82633A004352")?).await?);
//!     store.save(&session).await?;
//!     let tree = client.category_tree(&session.context()?).await?;
//!
//!     let sink = Arc::new(BroadcastSink::default());
//!     let mut events = sink.subscribe();
//!     let export_config = config.export.clone();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let ExportEvent::ExportReady(artifact) = &event {
//!                 if let Ok(path) = artifact.save(&export_config).await {
//!                     println!("Saved {}", path.display());
//!                 }
//!             }
//!         }
//!     });
//!
//!     let exporter = ExportOrchestrator::new(Arc::new(client), sink, config.export.clone());
//!     let handle = exporter
//!         .start(ExportPrerequisites { session: &session, category_tree: Some(&tree) })
//!         .await?;
//!     let result = handle.wait().await?;
//!     println!("{} rows ({})", result.rows.len(), result.status);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Pure transforms over loaded catalog data (group list, brand filter)
pub mod catalog;
/// Remote catalog API client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Bulk export orchestration, progress reporting, and CSV output
pub mod export;
/// Retry logic with exponential backoff
pub mod retry;
/// Session state and persistence
pub mod session;
/// Wire and domain types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use catalog::{BrandEntry, BrandFilterResult, extract_groups, filter_manufacturers};
pub use client::{CatalogClient, CatalogSource};
pub use config::{ApiConfig, Config, ExportConfig, FileCollisionAction, RetryConfig, SessionConfig};
pub use error::{Error, FetchStage, PreconditionError, Result};
pub use export::{
    BroadcastSink, ExportArtifact, ExportEvent, ExportHandle, ExportOrchestrator,
    ExportPrerequisites, ExportProgress, ExportResult, ExportStatus, LogEntry, LogLevel,
    ProgressSink, to_csv,
};
pub use session::{Session, SessionContext, SessionStore};
pub use types::{
    BrandRecord, BrandSelection, CatalogGroup, CatalogScope, CategoryTree, Ccl, ExtractedPartRow,
    ManufacturerRecord, Part, PartDetailQuery, Vin, VinDecoded,
};
