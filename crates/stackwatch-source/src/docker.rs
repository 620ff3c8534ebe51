//! Docker snapshot source.
//!
//! Lists running containers once per cycle and converts them to
//! observed units. Only containers carrying the configured project
//! label are kept.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::API_DEFAULT_VERSION;
use bollard::Docker;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use tracing::debug;

use stackwatch_core::ObservedUnit;

use crate::error::{SourceError, SourceResult};
use crate::SnapshotSource;

/// Snapshot source backed by the local Docker daemon.
pub struct DockerSource {
    docker: Docker,
    project_key: String,
}

impl DockerSource {
    /// Connect to the Docker daemon. `host` overrides the local
    /// defaults (unix socket / DOCKER_HOST) with an HTTP address.
    pub fn connect(host: Option<&str>, project_key: impl Into<String>) -> SourceResult<Self> {
        let docker = match host {
            Some(addr) => Docker::connect_with_http(addr, 4, API_DEFAULT_VERSION)
                .map_err(|e| SourceError::Connect(e.to_string()))?,
            None => Docker::connect_with_local_defaults()
                .map_err(|e| SourceError::Connect(e.to_string()))?,
        };
        Ok(Self {
            docker,
            project_key: project_key.into(),
        })
    }
}

#[async_trait]
impl SnapshotSource for DockerSource {
    async fn list_units(&self) -> SourceResult<Vec<ObservedUnit>> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let units: Vec<ObservedUnit> = containers
            .into_iter()
            .filter_map(|summary| observe(summary, &self.project_key))
            .collect();
        debug!(units = units.len(), "containers listed");
        Ok(units)
    }
}

/// Convert one container summary into an observed unit.
///
/// Returns `None` for containers without the project label. The
/// display name is the container's primary name (sans the leading
/// slash Docker prepends), falling back to the short container ID.
fn observe(summary: ContainerSummary, project_key: &str) -> Option<ObservedUnit> {
    let labels: HashMap<String, String> = summary.labels.unwrap_or_default();
    let project = labels.get(project_key)?.clone();

    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|name| name.trim_start_matches('/').to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| {
            summary
                .id
                .as_ref()
                .map(|id| id.chars().take(12).collect::<String>())
        })?;

    Some(ObservedUnit {
        project,
        name,
        status: summary.status.unwrap_or_default(),
        labels,
    })
}
