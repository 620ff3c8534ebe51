//! View types for template rendering.
//!
//! Purpose-built for the Askama template: pre-formatted strings and
//! computed fields so the template stays simple.

use stackwatch_core::{HostSample, ProbeOutcome};
use stackwatch_state::{GroupView, StatusView, projection::UNGROUPED};

/// Host stats, formatted for the header table.
pub struct StatsView {
    pub cpu_display: String,
    pub mem_display: String,
    pub load_display: String,
}

impl StatsView {
    pub fn from_sample(sample: &HostSample) -> Self {
        let cpu_display = match sample.cpu_temp {
            Some(temp) => format!("{:.2}% {:.0}°C", sample.cpu_percent, temp),
            None => format!("{:.2}%", sample.cpu_percent),
        };
        Self {
            cpu_display,
            mem_display: format!(
                "{} / {}",
                format_bytes(sample.mem_used),
                format_bytes(sample.mem_total)
            ),
            load_display: format!(
                "{:.2} {:.2} {:.2}",
                sample.load1, sample.load5, sample.load15
            ),
        }
    }
}

/// Inline SVG sparkline for one history series.
pub struct Sparkline {
    /// Polyline points, "x,y" pairs.
    pub points: String,
    pub label: &'static str,
}

impl Sparkline {
    /// Build a sparkline from a series; `None` when there are too few
    /// points to draw a line.
    pub fn from_series(label: &'static str, values: &[f32]) -> Option<Self> {
        Some(Self {
            points: polyline_points(values, 120.0, 28.0)?,
            label,
        })
    }
}

/// One unit row.
pub struct UnitRow {
    pub name: String,
    pub link: Option<String>,
    pub down: bool,
    /// Status text, or "last seen N ago" for down units.
    pub status_display: String,
    pub health: Option<HealthBadge>,
}

/// Health annotation for a unit row.
pub struct HealthBadge {
    pub ok: bool,
    pub label: String,
}

impl HealthBadge {
    pub fn from_outcome(outcome: &ProbeOutcome) -> Self {
        let label = if outcome.timed_out {
            "health timeout".to_string()
        } else {
            match outcome.code {
                Some(code) => format!("{} {}ms", code, outcome.elapsed.as_millis()),
                None => "unreachable".to_string(),
            }
        };
        Self {
            ok: outcome.ok,
            label,
        }
    }
}

pub struct ProjectCard {
    pub name: String,
    pub units: Vec<UnitRow>,
}

pub struct GroupSection {
    pub name: String,
    /// The ungrouped sentinel renders without a heading.
    pub named: bool,
    pub projects: Vec<ProjectCard>,
}

impl GroupSection {
    pub fn from_group(group: &GroupView, now: u64) -> Self {
        let projects = group
            .projects
            .iter()
            .map(|project| ProjectCard {
                name: project.name.clone(),
                units: project
                    .units
                    .iter()
                    .map(|unit| UnitRow {
                        name: unit.name.clone(),
                        link: unit.link.clone(),
                        down: unit.down,
                        status_display: if unit.down {
                            format!("last seen {}", humanize_ago(now.saturating_sub(unit.last_seen)))
                        } else {
                            unit.status.clone()
                        },
                        health: unit.health.as_ref().map(HealthBadge::from_outcome),
                    })
                    .collect(),
            })
            .collect();
        Self {
            name: group.name.clone(),
            named: group.name != UNGROUPED,
            projects,
        }
    }
}

/// Build all group sections from a published view.
pub fn group_sections(view: &StatusView, now: u64) -> Vec<GroupSection> {
    view.groups
        .iter()
        .map(|group| GroupSection::from_group(group, now))
        .collect()
}

/// Format a byte count with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Humanize a duration in seconds, e.g. "5m ago".
pub fn humanize_ago(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// Scale a series into SVG polyline points. Returns `None` for series
/// shorter than two points.
fn polyline_points(values: &[f32], width: f32, height: f32) -> Option<String> {
    if values.len() < 2 {
        return None;
    }
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = (max - min).max(f32::EPSILON);
    let step = width / (values.len() - 1) as f32;

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = step * i as f32;
            let y = height - ((value - min) / span) * height;
            format!("{x:.1},{y:.1}")
        })
        .collect();
    Some(points.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn bytes_formatted_with_binary_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }

    #[test]
    fn ago_picks_the_largest_fitting_unit() {
        assert_eq!(humanize_ago(30), "30s ago");
        assert_eq!(humanize_ago(150), "2m ago");
        assert_eq!(humanize_ago(7200), "2h ago");
        assert_eq!(humanize_ago(200_000), "2d ago");
    }

    #[test]
    fn sparkline_needs_two_points() {
        assert!(Sparkline::from_series("cpu", &[]).is_none());
        assert!(Sparkline::from_series("cpu", &[1.0]).is_none());
        assert!(Sparkline::from_series("cpu", &[1.0, 2.0]).is_some());
    }

    #[test]
    fn sparkline_spans_full_width() {
        let spark = Sparkline::from_series("cpu", &[0.0, 50.0, 100.0]).unwrap();
        let points: Vec<&str> = spark.points.split(' ').collect();
        assert_eq!(points.len(), 3);
        assert!(points[0].starts_with("0.0,"));
        assert!(points[2].starts_with("120.0,"));
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let spark = Sparkline::from_series("temp", &[40.0, 40.0, 40.0]).unwrap();
        for pair in spark.points.split(' ') {
            let y: f32 = pair.split(',').nth(1).unwrap().parse().unwrap();
            assert!(y.is_finite());
        }
    }

    #[test]
    fn health_badge_shows_code_and_latency() {
        let badge = HealthBadge::from_outcome(&ProbeOutcome {
            ok: true,
            code: Some(200),
            elapsed: Duration::from_millis(4),
            timed_out: false,
        });
        assert!(badge.ok);
        assert_eq!(badge.label, "200 4ms");
    }

    #[test]
    fn health_badge_shows_timeout() {
        let badge = HealthBadge::from_outcome(&ProbeOutcome {
            ok: false,
            code: None,
            elapsed: Duration::from_millis(150),
            timed_out: true,
        });
        assert!(!badge.ok);
        assert_eq!(badge.label, "health timeout");
    }

    #[test]
    fn down_unit_shows_last_seen() {
        use stackwatch_state::{GroupView, ProjectView, UnitView};

        let group = GroupView {
            name: "~".to_string(),
            projects: vec![ProjectView {
                name: "media".to_string(),
                units: vec![UnitView {
                    name: "plex".to_string(),
                    status: "up 3 days".to_string(),
                    link: None,
                    down: true,
                    last_seen: 900,
                    health: None,
                }],
            }],
        };
        let section = GroupSection::from_group(&group, 1200);
        assert!(!section.named);
        assert_eq!(section.projects[0].units[0].status_display, "last seen 5m ago");
    }
}
