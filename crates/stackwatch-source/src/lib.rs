//! stackwatch-source — snapshot sources for the reconciliation engine.
//!
//! A [`SnapshotSource`] produces one unordered list of observed units
//! per poll cycle. The production implementation lists running
//! containers from the Docker daemon; tests substitute their own.
//!
//! Containers without the configured project label are ignored
//! entirely — they are not compose-managed and not an error.

pub mod docker;
pub mod error;

pub use docker::DockerSource;
pub use error::{SourceError, SourceResult};

use async_trait::async_trait;

use stackwatch_core::ObservedUnit;

/// A source of per-cycle container observations.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// List the currently running units. A failure here aborts the
    /// pass; prior state stays authoritative.
    async fn list_units(&self) -> SourceResult<Vec<ObservedUnit>>;
}
