//! The immutable view published at the end of each reconciliation pass.
//!
//! The daemon swaps a fresh `StatusView` into a watch channel once per
//! cycle; HTTP handlers borrow the latest one and never observe a
//! pass mid-mutation.

use stackwatch_core::HostSample;

use crate::projection::GroupView;

/// Everything the dashboard needs to render one page.
#[derive(Debug, Clone, Default)]
pub struct StatusView {
    /// Unix timestamp (seconds) of the pass that produced this view.
    pub generated_at: u64,
    /// Host metrics for this cycle; `None` until the first sample.
    pub stats: Option<HostSample>,
    /// Rolling CPU usage history, oldest first.
    pub cpu_history: Vec<f32>,
    /// Rolling CPU temperature history, oldest first.
    pub temp_history: Vec<f32>,
    /// Ordered groups → projects → units.
    pub groups: Vec<GroupView>,
}

impl StatusView {
    /// The view served before the first pass completes.
    pub fn empty() -> Self {
        Self::default()
    }
}
