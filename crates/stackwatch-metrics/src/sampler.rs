//! Host metrics sampling.
//!
//! Maintains a reusable `sysinfo::System` and `Components` instance so
//! each cycle is a refresh, not a reallocation, and CPU usage has a
//! stable baseline between samples.

use sysinfo::{Components, System};
use tracing::debug;

use stackwatch_core::HostSample;

/// Samples load, memory, CPU usage, and CPU temperature once per cycle.
pub struct HostSampler {
    sys: System,
    components: Components,
}

impl HostSampler {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Initial refresh so the first sample's CPU delta is meaningful.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let components = Components::new_with_refreshed_list();
        Self { sys, components }
    }

    /// Refresh and return a snapshot. Metrics are read independently;
    /// an absent temperature sensor leaves `cpu_temp` as `None`
    /// without affecting the rest.
    pub fn sample(&mut self) -> HostSample {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();

        let load = System::load_average();
        let sample = HostSample {
            load1: load.one,
            load5: load.five,
            load15: load.fifteen,
            mem_used: self.sys.used_memory(),
            mem_total: self.sys.total_memory(),
            cpu_percent: self.sys.global_cpu_usage(),
            cpu_temp: self.cpu_temperature(),
        };
        debug!(
            cpu = sample.cpu_percent,
            temp = ?sample.cpu_temp,
            mem_used = sample.mem_used,
            "host metrics sampled"
        );
        sample
    }

    /// Hottest reported component temperature, if any sensor exists.
    fn cpu_temperature(&mut self) -> Option<f32> {
        self.components.refresh(false);
        self.components
            .iter()
            .filter_map(|component| component.temperature())
            .fold(None, |hottest, temp| match hottest {
                Some(current) if current >= temp => Some(current),
                _ => Some(temp),
            })
    }
}

impl Default for HostSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_yields_finite_values() {
        let mut sampler = HostSampler::new();
        let sample = sampler.sample();

        assert!(sample.cpu_percent.is_finite());
        assert!(sample.load1.is_finite());
        assert!(sample.mem_used <= sample.mem_total);
        if let Some(temp) = sample.cpu_temp {
            assert!(temp.is_finite());
        }
    }

    #[test]
    fn repeated_samples_do_not_panic() {
        let mut sampler = HostSampler::new();
        for _ in 0..3 {
            let _ = sampler.sample();
        }
    }
}
