//! Error types for snapshot sources.

use thiserror::Error;

/// Result type alias for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors from a snapshot source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The runtime could not be reached or refused the listing. The
    /// pass aborts and is retried on the next tick.
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),

    #[error("failed to connect to container runtime: {0}")]
    Connect(String),
}
