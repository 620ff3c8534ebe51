//! stackwatchd — the stackwatch daemon.
//!
//! Single binary that assembles the whole dashboard:
//! - Docker snapshot source
//! - Reconciliation loop (one pass per scan interval)
//! - Health probes + host metrics per pass
//! - axum server rendering the latest published view
//! - Resume file loaded at startup, saved atomically on shutdown
//!
//! # Usage
//!
//! ```text
//! stackwatchd --page-title "home server" --scan-interval 10
//! ```
//!
//! Every flag also reads a `STACKWATCH_*` environment variable.

mod poll;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use stackwatch_core::{Config, LabelKeys};
use stackwatch_dashboard::DashboardState;
use stackwatch_source::DockerSource;
use stackwatch_state::{Registry, StatusView, resume};

#[derive(Parser)]
#[command(name = "stackwatchd", about = "Compose container status dashboard", version)]
struct Cli {
    /// Title shown at the top of the page.
    #[arg(long, env = "STACKWATCH_PAGE_TITLE", default_value = "server status")]
    page_title: String,

    /// Listen address for the dashboard.
    #[arg(long, env = "STACKWATCH_LISTEN_ADDR", default_value = "0.0.0.0:9293")]
    listen_addr: String,

    /// Seconds between reconciliation passes.
    #[arg(long, env = "STACKWATCH_SCAN_INTERVAL", default_value = "10")]
    scan_interval: u64,

    /// Seconds a down container is remembered before being forgotten.
    #[arg(long, env = "STACKWATCH_CLEAN_CUTOFF", default_value = "259200")]
    clean_cutoff: u64,

    /// Seconds of CPU/temperature history kept for the sparklines.
    #[arg(long, env = "STACKWATCH_HISTORY_WINDOW", default_value = "1800")]
    history_window: u64,

    /// Hard timeout for a single health probe, in milliseconds.
    #[arg(long, env = "STACKWATCH_PROBE_TIMEOUT_MS", default_value = "150")]
    probe_timeout_ms: u64,

    /// Host health probes are issued against.
    #[arg(long, env = "STACKWATCH_PROBE_HOST", default_value = "127.0.0.1")]
    probe_host: String,

    /// Path of the resume file.
    #[arg(long, env = "STACKWATCH_RESUME_PATH", default_value = "stackwatch.json")]
    resume_path: PathBuf,

    /// Docker daemon HTTP address; local defaults when unset.
    #[arg(long, env = "STACKWATCH_DOCKER_HOST")]
    docker_host: Option<String>,

    /// Label carrying compose project membership.
    #[arg(long, env = "STACKWATCH_PROJECT_LABEL", default_value = "com.docker.compose.project")]
    project_label: String,

    /// Label carrying the display group of a project.
    #[arg(long, env = "STACKWATCH_GROUP_LABEL", default_value = "status.group")]
    group_label: String,

    /// Label carrying the routing rule the deep link is parsed from.
    #[arg(long, env = "STACKWATCH_LINK_LABEL", default_value = "traefik.frontend.rule")]
    link_label: String,

    /// Label carrying the health check port.
    #[arg(long, env = "STACKWATCH_HEALTH_PORT_LABEL", default_value = "status.health.port")]
    health_port_label: String,

    /// Label carrying the health check method.
    #[arg(long, env = "STACKWATCH_HEALTH_METHOD_LABEL", default_value = "status.health.method")]
    health_method_label: String,

    /// Label carrying the health check path.
    #[arg(long, env = "STACKWATCH_HEALTH_PATH_LABEL", default_value = "status.health.path")]
    health_path_label: String,

    /// Label carrying the health check expected status code.
    #[arg(long, env = "STACKWATCH_HEALTH_CODE_LABEL", default_value = "status.health.code")]
    health_code_label: String,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            page_title: self.page_title,
            listen_addr: self.listen_addr,
            scan_interval: Duration::from_secs(self.scan_interval),
            clean_cutoff: Duration::from_secs(self.clean_cutoff),
            history_window: Duration::from_secs(self.history_window),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            probe_host: self.probe_host,
            resume_path: self.resume_path,
            docker_host: self.docker_host,
            labels: LabelKeys {
                project: self.project_label,
                group: self.group_label,
                link: self.link_label,
                health_port: self.health_port_label,
                health_method: self.health_method_label,
                health_path: self.health_path_label,
                health_expect: self.health_code_label,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stackwatch=debug".parse().expect("static filter")),
        )
        .init();

    let config = Cli::parse().into_config();
    config.validate()?;

    // Seed the registry from the resume file so a restart does not
    // show every previously-up service as newly appeared.
    let registry = match resume::load(&config.resume_path) {
        Ok(Some(units)) => {
            info!(path = %config.resume_path.display(), units = units.len(), "resume state loaded");
            Registry::from_units(units)
        }
        Ok(None) => {
            info!(path = %config.resume_path.display(), "no resume file, starting empty");
            Registry::new()
        }
        Err(e) => {
            warn!(error = %e, "could not load resume state, starting empty");
            Registry::new()
        }
    };

    let source = DockerSource::connect(config.docker_host.as_deref(), config.labels.project.clone())?;
    info!("docker snapshot source connected");

    let (view_tx, view_rx) = watch::channel(Arc::new(StatusView::empty()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Reconciliation loop.
    let poll_task = poll::PollTask::new(config.clone(), Box::new(source), registry, view_tx);
    let poll_handle = tokio::spawn(poll_task.run(shutdown_rx.clone()));

    // Dashboard server.
    let router = stackwatch_dashboard::router(DashboardState {
        title: config.page_title.clone(),
        view_rx,
    });
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "dashboard listening");

    let mut server_shutdown = shutdown_rx.clone();
    let server_handle = tokio::spawn(async move {
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = server_shutdown.changed().await;
        });
        if let Err(e) = server.await {
            error!(error = %e, "dashboard server failed");
        }
    });

    shutdown_signal().await;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    // The loop finishes its in-flight pass and hands the registry back
    // for persistence.
    let registry = poll_handle.await?;
    let _ = server_handle.await;

    if let Err(e) = resume::save(&config.resume_path, &registry.into_units()) {
        // Loud on purpose: a lost resume file silently resets history
        // on the next start.
        error!(error = %e, path = %config.resume_path.display(), "failed to save resume state");
        anyhow::bail!("failed to save resume state: {e}");
    }
    info!(path = %config.resume_path.display(), "resume state saved");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
