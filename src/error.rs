//! Error types for catalog-export
//!
//! This module provides the error taxonomy for the library:
//! - Run-level failures that escape `start()` (preconditions, malformed trees)
//! - Per-group fetch failures that the export loop records and swallows
//! - Transport, decoding, and remote API errors raised by the catalog client

use crate::export::ExportStatus;
use thiserror::Error;

/// Result type alias for catalog-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for catalog-export
#[derive(Debug, Error)]
pub enum Error {
    /// A prerequisite for the requested operation is missing
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// The category tree is absent or has no group-bearing collection
    #[error("invalid category tree: {0}")]
    InvalidTree(String),

    /// Fetching manufacturers or parts for one catalog group failed
    #[error("{stage} fetch failed for group {group_id}: {reason}")]
    GroupFetch {
        /// The catalog group being processed
        group_id: i64,
        /// Which request of the per-group pipeline failed
        stage: FetchStage,
        /// The underlying failure, rendered for the progress log
        reason: String,
    },

    /// The remote API rejected the bearer token (HTTP 401)
    #[error("session expired, please login again")]
    SessionExpired,

    /// The remote API answered with a non-success status
    #[error("{context} failed: HTTP {status}. {message}")]
    Api {
        /// Which call failed (e.g. "manufacturers fetch")
        context: String,
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The remote API answered successfully but the payload is unusable
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Caller-supplied input was rejected before any request was made
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api.base_url")
        key: Option<String>,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV rendering error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the bearer token is no longer accepted
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }

    /// Wrap a client failure as a per-group fetch error.
    ///
    /// `SessionExpired` is passed through unchanged so the export loop can
    /// still tell authentication failures apart.
    pub(crate) fn for_group(self, group_id: i64, stage: FetchStage) -> Self {
        match self {
            Error::SessionExpired => Error::SessionExpired,
            other => Error::GroupFetch {
                group_id,
                stage,
                reason: other.to_string(),
            },
        }
    }
}

/// Missing prerequisites, named so the UI can tell the user what to do next
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// An export run is already in progress
    #[error("an export is already in progress")]
    AlreadyRunning,

    /// No session token; the user must log in first
    #[error("not authenticated, please login first")]
    MissingSession,

    /// No vehicle configuration; the user must decode a VIN first
    #[error("no vehicle configuration, please decode a VIN first")]
    MissingVehicleConfig,

    /// No category tree has been loaded yet
    #[error("category tree not loaded, please load the category tree first")]
    MissingCategoryTree,

    /// A result was requested before the run reached a final state
    #[error("no export result available while the run is {status}")]
    ResultUnavailable {
        /// The run status at the time of the request
        status: ExportStatus,
    },
}

/// The network request of the per-group pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// `GET /api/parts/manufacturers`
    Manufacturers,
    /// `GET /api/parts/get-part-fitments`
    Parts,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStage::Manufacturers => write!(f, "manufacturers"),
            FetchStage::Parts => write!(f, "parts"),
        }
    }
}
