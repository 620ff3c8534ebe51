//! Grouping projection — the ordered, display-ready shape of the registry.
//!
//! A pure function from the unit mapping (plus this cycle's probe
//! results) to groups of projects of units. Ordering is lexicographic
//! at every level so repeated calls without mutation render
//! identically and the page never jitters between polls.

use std::collections::{BTreeMap, HashMap};

use stackwatch_core::{ProbeOutcome, UnitKey, UnitRecord};

/// Sentinel group for projects without an explicit group label.
pub const UNGROUPED: &str = "~";

/// One unit as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitView {
    pub name: String,
    pub status: String,
    pub link: Option<String>,
    pub down: bool,
    pub last_seen: u64,
    /// This cycle's probe outcome, if the unit declares a health check.
    pub health: Option<ProbeOutcome>,
}

/// A project with its units, sorted by unit name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    pub name: String,
    pub units: Vec<UnitView>,
}

/// A group with its projects, sorted by project name.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupView {
    pub name: String,
    pub projects: Vec<ProjectView>,
}

/// Project the unit mapping into ordered groups.
///
/// A project's group is sourced from unit-level labels; when units in
/// the same project disagree, the last one in key order wins. Projects
/// with no group land in the [`UNGROUPED`] sentinel.
pub fn project_view(
    units: &BTreeMap<UnitKey, UnitRecord>,
    health: &HashMap<UnitKey, ProbeOutcome>,
) -> Vec<GroupView> {
    // project → (group, units). BTreeMap iteration is already sorted
    // by (project, name), so unit order falls out for free.
    let mut projects: BTreeMap<String, (String, Vec<UnitView>)> = BTreeMap::new();

    for (key, record) in units {
        let entry = projects
            .entry(key.project.clone())
            .or_insert_with(|| (UNGROUPED.to_string(), Vec::new()));
        if let Some(group) = &record.group {
            entry.0 = group.clone();
        }
        entry.1.push(UnitView {
            name: key.name.clone(),
            status: record.status.clone(),
            link: record.link.clone(),
            down: record.down,
            last_seen: record.last_seen,
            health: health.get(key).copied(),
        });
    }

    let mut groups: BTreeMap<String, Vec<ProjectView>> = BTreeMap::new();
    for (project, (group, units)) in projects {
        groups
            .entry(group)
            .or_default()
            .push(ProjectView { name: project, units });
    }

    groups
        .into_iter()
        .map(|(name, projects)| GroupView { name, projects })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(group: Option<&str>, down: bool) -> UnitRecord {
        UnitRecord {
            status: "up".to_string(),
            link: None,
            group: group.map(str::to_string),
            health: None,
            last_seen: 100,
            down,
        }
    }

    fn units(entries: &[(&str, &str, Option<&str>)]) -> BTreeMap<UnitKey, UnitRecord> {
        entries
            .iter()
            .map(|(project, name, group)| (UnitKey::new(*project, *name), record(*group, false)))
            .collect()
    }

    #[test]
    fn units_sorted_within_project() {
        let groups = project_view(
            &units(&[("media", "zeta", None), ("media", "alpha", None)]),
            &HashMap::new(),
        );
        let names: Vec<_> = groups[0].projects[0]
            .units
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn projects_sorted_within_group() {
        let groups = project_view(
            &units(&[("zeta", "a", None), ("alpha", "a", None)]),
            &HashMap::new(),
        );
        let names: Vec<_> = groups[0].projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn ungrouped_projects_use_sentinel() {
        let groups = project_view(&units(&[("media", "plex", None)]), &HashMap::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, UNGROUPED);
    }

    #[test]
    fn groups_sorted_by_name() {
        let groups = project_view(
            &units(&[
                ("p1", "a", Some("lab")),
                ("p2", "a", Some("home")),
                ("p3", "a", None),
            ]),
            &HashMap::new(),
        );
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["home", "lab", UNGROUPED]);
    }

    #[test]
    fn conflicting_group_labels_last_unit_wins() {
        let groups = project_view(
            &units(&[("media", "a", Some("one")), ("media", "b", Some("two"))]),
            &HashMap::new(),
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "two");
    }

    #[test]
    fn unlabeled_unit_does_not_clear_group() {
        let groups = project_view(
            &units(&[("media", "a", Some("home")), ("media", "z", None)]),
            &HashMap::new(),
        );
        assert_eq!(groups[0].name, "home");
        assert_eq!(groups[0].projects[0].units.len(), 2);
    }

    #[test]
    fn projection_is_deterministic() {
        let map = units(&[
            ("p2", "b", Some("g1")),
            ("p1", "a", None),
            ("p2", "a", Some("g1")),
            ("p3", "x", Some("g2")),
        ]);
        let first = project_view(&map, &HashMap::new());
        let second = project_view(&map, &HashMap::new());
        assert_eq!(first, second);
    }

    #[test]
    fn probe_outcomes_attached_to_matching_units() {
        use std::time::Duration;

        let map = units(&[("media", "plex", None), ("media", "sonarr", None)]);
        let mut health = HashMap::new();
        health.insert(
            UnitKey::new("media", "plex"),
            ProbeOutcome {
                ok: true,
                code: Some(200),
                elapsed: Duration::from_millis(4),
                timed_out: false,
            },
        );

        let groups = project_view(&map, &health);
        let units = &groups[0].projects[0].units;
        assert!(units[0].health.is_some());
        assert!(units[1].health.is_none());
    }
}
