use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::CompileError;
use crate::evidence::evidence_model::EvidenceEvent;

/// Load an ordered evidence event list from a JSON file.
///
/// The file must hold a JSON array; anything else is rejected before any
/// event is decoded, so a load is all-or-nothing.
pub fn load_events(path: &Path) -> Result<Vec<EvidenceEvent>, CompileError> {
    let raw = std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
    let events = parse_events(&raw, path)?;
    debug!(count = events.len(), path = %path.display(), "loaded evidence events");
    Ok(events)
}

/// Parse an event list from JSON text. `origin` is only used in errors.
pub fn parse_events(raw: &str, origin: &Path) -> Result<Vec<EvidenceEvent>, CompileError> {
    let parsed: Value = serde_json::from_str(raw).map_err(|e| CompileError::JsonParse {
        context: format!("events file {}", origin.display()),
        source: e,
    })?;

    if !parsed.is_array() {
        return Err(CompileError::EventsNotArray {
            path: origin.to_path_buf(),
        });
    }

    serde_json::from_value(parsed).map_err(|e| CompileError::JsonParse {
        context: format!("evidence events in {}", origin.display()),
        source: e,
    })
}
