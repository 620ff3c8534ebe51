//! The periodic reconciliation loop.
//!
//! One pass per tick: list containers, reconcile, probe health,
//! sample host metrics, project, publish. Missed ticks are skipped so
//! passes never overlap; a failed pass logs and leaves the previous
//! view published.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use stackwatch_core::Config;
use stackwatch_health::probe_all;
use stackwatch_metrics::{History, HostSampler};
use stackwatch_source::SnapshotSource;
use stackwatch_state::{Registry, StatusView, project_view};

/// Unix timestamp in seconds.
fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Owns everything one reconciliation pass touches. The registry is
/// exclusively held here; readers only ever see published views.
pub struct PollTask {
    config: Config,
    source: Box<dyn SnapshotSource>,
    registry: Registry,
    sampler: HostSampler,
    cpu_history: History,
    temp_history: History,
    view_tx: watch::Sender<Arc<StatusView>>,
}

impl PollTask {
    pub fn new(
        config: Config,
        source: Box<dyn SnapshotSource>,
        registry: Registry,
        view_tx: watch::Sender<Arc<StatusView>>,
    ) -> Self {
        let capacity = config.history_capacity();
        Self {
            config,
            source,
            registry,
            sampler: HostSampler::new(),
            cpu_history: History::new(capacity),
            temp_history: History::new(capacity),
            view_tx,
        }
    }

    /// Run until the shutdown signal, then yield the registry for
    /// resume persistence. The in-flight pass always completes.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Registry {
        let mut ticker = tokio::time::interval(self.config.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            interval_secs = self.config.scan_interval.as_secs(),
            "reconciliation loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.pass().await {
                        warn!(error = %e, "reconciliation pass failed, previous view stays published");
                    }
                }
                _ = shutdown.changed() => {
                    info!("reconciliation loop shutting down");
                    break;
                }
            }
        }
        self.registry
    }

    /// One full pass. Any error aborts before the view is replaced.
    async fn pass(&mut self) -> anyhow::Result<()> {
        let snapshot = self.source.list_units().await?;
        let now = epoch_secs();
        self.registry.reconcile(
            &snapshot,
            &self.config.labels,
            now,
            self.config.clean_cutoff,
        )?;

        let health = probe_all(
            self.registry.units(),
            &self.config.probe_host,
            self.config.probe_timeout,
        )
        .await;

        let sample = self.sampler.sample();
        self.cpu_history.push(sample.cpu_percent);
        if let Some(temp) = sample.cpu_temp {
            self.temp_history.push(temp);
        }

        let groups = project_view(self.registry.units(), &health);
        self.view_tx.send_replace(Arc::new(StatusView {
            generated_at: now,
            stats: Some(sample),
            cpu_history: self.cpu_history.values(),
            temp_history: self.temp_history.values(),
            groups,
        }));
        Ok(())
    }
}
