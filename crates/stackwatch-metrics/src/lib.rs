//! stackwatch-metrics — host metrics for the status page.
//!
//! One [`HostSampler::sample`] per poll cycle; CPU usage and
//! temperature additionally feed fixed-capacity [`History`] buffers
//! for the sparklines. Each metric is read independently — a missing
//! temperature sensor yields `None` and is skipped by its buffer, the
//! rest of the sample is unaffected.

pub mod history;
pub mod sampler;

pub use history::History;
pub use sampler::HostSampler;
