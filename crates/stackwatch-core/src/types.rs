//! Domain types shared across the stackwatch crates.
//!
//! `UnitKey` and `UnitRecord` are the persisted shape of tracked
//! containers; everything else is per-cycle data that is rebuilt on
//! every poll and never written to disk.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Composite identity of a tracked unit: compose project + display name.
///
/// Stable across container recreation — a fresh container ID for the
/// same logical service maps to the same key. Ordered by project, then
/// name, so map iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitKey {
    pub project: String,
    pub name: String,
}

impl UnitKey {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.name)
    }
}

impl FromStr for UnitKey {
    type Err = String;

    // Compose project names cannot contain '/', so splitting on the
    // first one is unambiguous even if the unit name contains slashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((project, name)) if !project.is_empty() && !name.is_empty() => {
                Ok(Self::new(project, name))
            }
            _ => Err(format!("invalid unit key: {s:?}")),
        }
    }
}

// Serialized as a single "{project}/{name}" string so a map keyed by
// `UnitKey` round-trips as a plain JSON object.
impl Serialize for UnitKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnitKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Durable per-unit state owned by the reconciliation engine.
///
/// Identity is the map key, never stored in the record; only
/// status, flags, and timestamps mutate after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Last observed status string, lower-cased.
    pub status: String,
    /// Deep link derived from routing labels, if any.
    pub link: Option<String>,
    /// Group membership inherited from the unit's labels, if any.
    pub group: Option<String>,
    /// Health check configuration derived from labels, if any.
    pub health: Option<HealthSpec>,
    /// Unix timestamp (seconds) of the last poll that observed this unit.
    pub last_seen: u64,
    /// Whether the unit was absent from the most recent snapshot.
    pub down: bool,
}

/// One raw snapshot entry, as produced by a snapshot source.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedUnit {
    pub project: String,
    pub name: String,
    pub status: String,
    pub labels: HashMap<String, String>,
}

/// Health check parameters parsed from a unit's labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSpec {
    /// Port to probe on the probe host.
    pub port: u16,
    /// HTTP method, e.g. "GET".
    pub method: String,
    /// HTTP path to probe, e.g. "/healthz".
    pub path: String,
    /// Expected response status code.
    pub expect: u16,
}

/// Result of a single health probe. Cycle-local: attached to the
/// published view for the current pass only, never merged into
/// `UnitRecord`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    /// Whether the response matched the expected status code.
    pub ok: bool,
    /// Response status code, if a response was received.
    pub code: Option<u16>,
    /// Round-trip time of the probe.
    pub elapsed: Duration,
    /// Whether the probe hit its hard timeout.
    pub timed_out: bool,
}

/// Host-level metrics sampled once per poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostSample {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    /// Used memory in bytes.
    pub mem_used: u64,
    /// Total memory in bytes.
    pub mem_total: u64,
    /// Global CPU usage, 0-100.
    pub cpu_percent: f32,
    /// CPU temperature in °C, if a sensor is present.
    pub cpu_temp: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_key_display_round_trips() {
        let key = UnitKey::new("media", "plex");
        let parsed: UnitKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn unit_key_name_may_contain_slash() {
        let parsed: UnitKey = "infra/nginx/proxy".parse().unwrap();
        assert_eq!(parsed, UnitKey::new("infra", "nginx/proxy"));
    }

    #[test]
    fn unit_key_rejects_empty_halves() {
        assert!("".parse::<UnitKey>().is_err());
        assert!("noslash".parse::<UnitKey>().is_err());
        assert!("/name".parse::<UnitKey>().is_err());
        assert!("project/".parse::<UnitKey>().is_err());
    }

    #[test]
    fn unit_key_orders_by_project_then_name() {
        let mut keys = vec![
            UnitKey::new("b", "a"),
            UnitKey::new("a", "z"),
            UnitKey::new("a", "a"),
        ];
        keys.sort();
        assert_eq!(keys[0], UnitKey::new("a", "a"));
        assert_eq!(keys[1], UnitKey::new("a", "z"));
        assert_eq!(keys[2], UnitKey::new("b", "a"));
    }

    #[test]
    fn unit_key_serializes_as_string() {
        let key = UnitKey::new("media", "plex");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""media/plex""#);
        let back: UnitKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
