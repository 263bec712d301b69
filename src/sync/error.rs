//! Failure taxonomy for a mirror run.

use thiserror::Error;

/// Error type returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Why a mirror run stopped.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The search parameters cannot produce a meaningful query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The source tracker could not be queried.
    #[error("source tracker unavailable: {0}")]
    SourceUnavailable(#[source] PortError),

    /// The destination tracker rejected a lookup, listing or issue creation.
    #[error("destination tracker unavailable: {0}")]
    DestinationUnavailable(#[source] PortError),

    /// An issue exists for the bug but linking it back failed.
    ///
    /// The next run finds the issue again and completes the link.
    #[error("issue #{issue_number} exists for bug {bug_id} but linking it back failed: {source}")]
    WriteBackFailure {
        /// Source bug id.
        bug_id: u64,
        /// Destination issue number.
        issue_number: u64,
        /// Underlying port error.
        #[source]
        source: PortError,
    },
}
