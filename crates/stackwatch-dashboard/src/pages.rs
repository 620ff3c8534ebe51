//! Page handlers.
//!
//! The status handler reads the latest published view, builds the
//! pre-formatted view types, and renders the Askama template.

use std::time::{SystemTime, UNIX_EPOCH};

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use crate::DashboardState;
use crate::views::{GroupSection, Sparkline, StatsView, group_sections};

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "template render failed");
        format!("<pre>Template error: {e}</pre>")
    }))
}

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate {
    title: String,
    stats: Option<StatsView>,
    cpu_spark: Option<Sparkline>,
    temp_spark: Option<Sparkline>,
    groups: Vec<GroupSection>,
    generated_display: String,
}

pub async fn status(State(state): State<DashboardState>) -> Html<String> {
    let view = state.view_rx.borrow().clone();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let generated_display = chrono::DateTime::from_timestamp(view.generated_at as i64, 0)
        .map(|ts| ts.format("%H:%M:%S UTC").to_string())
        .unwrap_or_default();

    render(StatusTemplate {
        title: state.title.clone(),
        stats: view.stats.as_ref().map(StatsView::from_sample),
        cpu_spark: Sparkline::from_series("cpu %", &view.cpu_history),
        temp_spark: Sparkline::from_series("temp °C", &view.temp_history),
        groups: group_sections(&view, now),
        generated_display,
    })
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}
