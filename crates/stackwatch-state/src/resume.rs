//! Resume persistence — the serialized unit mapping written on
//! shutdown and read back on startup.
//!
//! The save path is atomic: the mapping is serialized fully in memory,
//! written to a sibling temp file, then renamed over the target, so an
//! interrupted write can never leave a corrupt resume file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use stackwatch_core::{UnitKey, UnitRecord};

use crate::error::{StateError, StateResult};

/// Load a previously saved unit mapping. Returns `Ok(None)` if no
/// resume file exists; a present-but-unreadable file is an error the
/// caller may choose to treat as non-fatal.
pub fn load(path: &Path) -> StateResult<Option<BTreeMap<UnitKey, UnitRecord>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StateError::ResumeRead(e.to_string())),
    };
    let units = serde_json::from_slice(&bytes).map_err(|e| StateError::ResumeParse(e.to_string()))?;
    debug!(path = %path.display(), "resume state loaded");
    Ok(Some(units))
}

/// Atomically save the unit mapping to `path`.
pub fn save(path: &Path, units: &BTreeMap<UnitKey, UnitRecord>) -> StateResult<()> {
    let bytes =
        serde_json::to_vec_pretty(units).map_err(|e| StateError::ResumeWrite(e.to_string()))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes).map_err(|e| StateError::ResumeWrite(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| StateError::ResumeWrite(e.to_string()))?;

    debug!(path = %path.display(), units = units.len(), "resume state saved");
    Ok(())
}
