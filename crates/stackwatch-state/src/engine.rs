//! Reconciliation engine — merges poll snapshots into durable unit state.
//!
//! `Registry` is the single mutable structure in the system. One
//! reconciliation pass builds the next generation of the map from the
//! previous one plus the snapshot and swaps it in whole, which gives
//! atomic abort on malformed input and avoids mutating a collection
//! while iterating it.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use stackwatch_core::{LabelKeys, ObservedUnit, UnitKey, UnitRecord, derive_group, derive_health, derive_link};

use crate::error::{StateError, StateResult};

/// Owns the mapping of unit identity → record across polls.
#[derive(Debug, Default)]
pub struct Registry {
    units: BTreeMap<UnitKey, UnitRecord>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded from a previously persisted mapping.
    pub fn from_units(units: BTreeMap<UnitKey, UnitRecord>) -> Self {
        Self { units }
    }

    /// The current mapping. Read-only; all mutation goes through
    /// [`Registry::reconcile`].
    pub fn units(&self) -> &BTreeMap<UnitKey, UnitRecord> {
        &self.units
    }

    /// Consume the registry, yielding the mapping for persistence.
    pub fn into_units(self) -> BTreeMap<UnitKey, UnitRecord> {
        self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Merge one poll's snapshot into the registry.
    ///
    /// Every observed unit is upserted with `last_seen = now` and
    /// `down = false`; tracked units absent from the snapshot are
    /// marked down, and units unseen for longer than `clean_cutoff`
    /// are evicted. On error the registry is left untouched.
    pub fn reconcile(
        &mut self,
        snapshot: &[ObservedUnit],
        keys: &LabelKeys,
        now: u64,
        clean_cutoff: Duration,
    ) -> StateResult<()> {
        // Validate the whole snapshot before touching anything.
        for observed in snapshot {
            if observed.project.is_empty() || observed.name.is_empty() {
                return Err(StateError::MalformedObservation(format!(
                    "unit with empty identity (project: {:?}, name: {:?})",
                    observed.project, observed.name
                )));
            }
        }

        let mut next = BTreeMap::new();
        for observed in snapshot {
            let key = UnitKey::new(observed.project.clone(), observed.name.clone());
            let record = UnitRecord {
                status: observed.status.to_lowercase(),
                link: derive_link(&observed.labels, keys),
                group: derive_group(&observed.labels, keys),
                health: derive_health(&observed.labels, keys),
                last_seen: now,
                down: false,
            };
            next.insert(key, record);
        }

        let mut evicted = 0usize;
        let mut marked_down = 0usize;
        for (key, record) in &self.units {
            if next.contains_key(key) {
                continue;
            }
            if now.saturating_sub(record.last_seen) > clean_cutoff.as_secs() {
                debug!(unit = %key, last_seen = record.last_seen, "unit evicted");
                evicted += 1;
                continue;
            }
            let mut stale = record.clone();
            stale.down = true;
            marked_down += 1;
            next.insert(key.clone(), stale);
        }

        debug!(
            observed = snapshot.len(),
            tracked = next.len(),
            marked_down,
            evicted,
            "reconciliation pass applied"
        );
        self.units = next;
        Ok(())
    }
}
