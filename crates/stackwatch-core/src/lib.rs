//! stackwatch-core — shared domain types for stackwatch.
//!
//! Holds the types that cross crate boundaries: the unit identity and
//! record tracked by the reconciliation engine, the raw observation
//! shape produced by snapshot sources, health probe configuration and
//! outcomes, host metric samples, and the daemon configuration.
//!
//! Label parsing lives here too: a unit's deep link, group membership,
//! and health check spec are all derived from container labels using
//! configurable label keys.

pub mod config;
pub mod labels;
pub mod types;

pub use config::{Config, ConfigError, LabelKeys};
pub use labels::{derive_group, derive_health, derive_link, parse_rule_host};
pub use types::{HealthSpec, HostSample, ObservedUnit, ProbeOutcome, UnitKey, UnitRecord};
