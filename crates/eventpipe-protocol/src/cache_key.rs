use sha2::{Digest, Sha256};

/// Deterministic cache key for an event body in the event processing
/// store, derived from `(project_id, event_id)` (SPEC_FULL.md §4.5/§4.6).
/// Same inputs always produce the same key, which is what lets replays of
/// the same message land on the same (already-consumed) store entry.
pub fn cache_key_for_event(project_id: i64, event_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_id.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(event_id.as_bytes());
    format!("e:{:x}", hasher.finalize())
}
