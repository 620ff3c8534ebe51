//! stackwatch-state — the stateful heart of stackwatch.
//!
//! The `Registry` exclusively owns the mapping of unit identity →
//! record across the process lifetime. Each poll cycle merges a fresh
//! snapshot into it (`engine`), projects the result into an ordered
//! display structure (`projection`), and the daemon publishes the
//! immutable `StatusView` for the HTTP layer to read.
//!
//! # Lifecycle of a unit
//!
//! ```text
//! observed            → upserted, last_seen = now, down = false
//! absent this cycle   → down = true, stale fields preserved
//! absent past cutoff  → evicted; reappearing later starts fresh
//! ```
//!
//! A pass either applies fully or not at all: the next generation of
//! the map is built from the previous one plus the snapshot and then
//! swapped in, so a malformed snapshot never partially overwrites
//! state.

pub mod engine;
pub mod error;
pub mod projection;
pub mod resume;
pub mod view;

pub use engine::Registry;
pub use error::{StateError, StateResult};
pub use projection::{GroupView, ProjectView, UnitView, project_view};
pub use view::StatusView;
