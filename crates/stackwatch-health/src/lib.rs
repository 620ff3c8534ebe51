//! stackwatch-health — per-cycle HTTP health probes.
//!
//! Stateless by design: liveness (`down`) comes from the
//! reconciliation engine; health comes from a fresh probe every cycle
//! and is never merged into persisted unit state. A probe failure or
//! timeout is an annotation on the page, not an error, and never
//! aborts the pass.
//!
//! The timeout is intentionally tight (default 150ms) since probes run
//! sequentially within the pass and must not stall it.

pub mod probe;

pub use probe::{probe, probe_all};
