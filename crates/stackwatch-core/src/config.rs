//! Daemon configuration.
//!
//! One explicit, validated struct constructed by the CLI layer — the
//! engine and its collaborators never read flags or environment
//! variables themselves.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by config validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scan interval must be greater than zero")]
    ZeroScanInterval,

    #[error("clean cutoff ({cutoff:?}) must be at least one scan interval ({interval:?})")]
    CutoffTooShort { cutoff: Duration, interval: Duration },

    #[error("history window must be greater than zero")]
    ZeroHistoryWindow,

    #[error("probe timeout must be greater than zero")]
    ZeroProbeTimeout,
}

/// Container label keys stackwatch reads. All keys are plain strings
/// matched case-sensitively; operators can remap any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelKeys {
    /// Compose project membership.
    pub project: String,
    /// Optional display group for a project.
    pub group: String,
    /// Routing rule the deep link is parsed from.
    pub link: String,
    /// Health check port (presence enables probing).
    pub health_port: String,
    /// Health check HTTP method.
    pub health_method: String,
    /// Health check HTTP path.
    pub health_path: String,
    /// Health check expected status code.
    pub health_expect: String,
}

impl Default for LabelKeys {
    fn default() -> Self {
        Self {
            project: "com.docker.compose.project".to_string(),
            group: "status.group".to_string(),
            link: "traefik.frontend.rule".to_string(),
            health_port: "status.health.port".to_string(),
            health_method: "status.health.method".to_string(),
            health_path: "status.health.path".to_string(),
            health_expect: "status.health.code".to_string(),
        }
    }
}

/// Full daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Title shown at the top of the page.
    pub page_title: String,
    /// Address the HTTP server listens on.
    pub listen_addr: String,
    /// Time between reconciliation passes.
    pub scan_interval: Duration,
    /// How long a down unit is remembered before being forgotten.
    pub clean_cutoff: Duration,
    /// Span covered by the metric history buffers.
    pub history_window: Duration,
    /// Hard timeout for a single health probe.
    pub probe_timeout: Duration,
    /// Host health probes are issued against.
    pub probe_host: String,
    /// Path of the resume file written on shutdown.
    pub resume_path: PathBuf,
    /// Docker daemon address override; local defaults when unset.
    pub docker_host: Option<String>,
    /// Label keys read from containers.
    pub labels: LabelKeys,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_title: "server status".to_string(),
            listen_addr: "0.0.0.0:9293".to_string(),
            scan_interval: Duration::from_secs(10),
            // Three days, matching the long-standing upstream default.
            clean_cutoff: Duration::from_secs(259_200),
            history_window: Duration::from_secs(30 * 60),
            probe_timeout: Duration::from_millis(150),
            probe_host: "127.0.0.1".to_string(),
            resume_path: PathBuf::from("stackwatch.json"),
            docker_host: None,
            labels: LabelKeys::default(),
        }
    }
}

impl Config {
    /// Validate field relationships. Called once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval.is_zero() {
            return Err(ConfigError::ZeroScanInterval);
        }
        if self.clean_cutoff < self.scan_interval {
            return Err(ConfigError::CutoffTooShort {
                cutoff: self.clean_cutoff,
                interval: self.scan_interval,
            });
        }
        if self.history_window.is_zero() {
            return Err(ConfigError::ZeroHistoryWindow);
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroProbeTimeout);
        }
        Ok(())
    }

    /// Number of samples the history buffers hold, derived once at
    /// startup. Not recomputed if the interval changes at runtime.
    pub fn history_capacity(&self) -> usize {
        let capacity = self.history_window.as_secs() / self.scan_interval.as_secs().max(1);
        (capacity as usize).max(1)
    }
}
