//! Error types for the stackwatch state crate.

use thiserror::Error;

/// Result type alias for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors from reconciliation and resume persistence.
#[derive(Debug, Error)]
pub enum StateError {
    /// An observed unit lacked identity data. The whole pass aborts
    /// without mutating the registry.
    #[error("malformed observation: {0}")]
    MalformedObservation(String),

    #[error("failed to read resume file: {0}")]
    ResumeRead(String),

    #[error("failed to parse resume file: {0}")]
    ResumeParse(String),

    #[error("failed to write resume file: {0}")]
    ResumeWrite(String),
}
