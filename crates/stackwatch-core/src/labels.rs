//! Label parsing — everything stackwatch derives from container labels.
//!
//! The label keys themselves are configuration (`LabelKeys`), matched
//! case-sensitively. Absent or unparseable labels mean "feature not
//! configured" for that unit, never an error.

use std::collections::HashMap;

use crate::config::LabelKeys;
use crate::types::HealthSpec;

/// Extract the first host from a traefik-style frontend rule.
///
/// `Host:a.example.com;Path=/x` → `a.example.com`, comma lists take
/// the first entry, and `HostRegexp` rules are rejected since a
/// pattern is not a linkable address.
pub fn parse_rule_host(rule: &str) -> Option<String> {
    let hosts = rule.strip_prefix("Host:")?;
    let first = hosts
        .split(';')
        .next()?
        .split(',')
        .next()?
        .trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Derive a unit's deep link from its routing label, if present.
pub fn derive_link(labels: &HashMap<String, String>, keys: &LabelKeys) -> Option<String> {
    labels.get(&keys.link).and_then(|rule| parse_rule_host(rule))
}

/// Derive a unit's group membership from its labels, if present.
pub fn derive_group(labels: &HashMap<String, String>, keys: &LabelKeys) -> Option<String> {
    labels
        .get(&keys.group)
        .filter(|g| !g.is_empty())
        .cloned()
}

/// Derive a unit's health check spec from its labels.
///
/// The port label is required; method, path, and expected code fall
/// back to `GET`, `/`, and `200`. An unparseable port means no health
/// check is configured for the unit.
pub fn derive_health(labels: &HashMap<String, String>, keys: &LabelKeys) -> Option<HealthSpec> {
    let port = labels.get(&keys.health_port)?.parse::<u16>().ok()?;
    let method = labels
        .get(&keys.health_method)
        .cloned()
        .unwrap_or_else(|| "GET".to_string());
    let path = labels
        .get(&keys.health_path)
        .cloned()
        .unwrap_or_else(|| "/".to_string());
    let expect = labels
        .get(&keys.health_expect)
        .and_then(|c| c.parse::<u16>().ok())
        .unwrap_or(200);
    Some(HealthSpec {
        port,
        method,
        path,
        expect,
    })
}
