//! stackwatch-dashboard — the server-rendered status page.
//!
//! One route: `GET /` renders the latest published [`StatusView`].
//! Handlers clone an `Arc` out of a watch channel, so the read path
//! takes no lock and never observes a reconciliation pass mid-mutation.

pub mod pages;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::sync::watch;

use stackwatch_state::StatusView;

/// Shared state for dashboard handlers.
#[derive(Clone)]
pub struct DashboardState {
    /// Title shown at the top of the page.
    pub title: String,
    /// Receiver of the most recently published view.
    pub view_rx: watch::Receiver<Arc<StatusView>>,
}

/// Build the dashboard router.
pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(pages::status))
        .fallback(pages::not_found)
        .with_state(state)
}
