//! Header name constants and the byte-string header map used by both the
//! producer (encoding) and the forwarders/pipeline (decoding).

/// Authoritative header names (SPEC_FULL.md §6).
pub mod names {
    pub const OPERATION: &str = "operation";
    pub const VERSION: &str = "version";
    pub const RECEIVED_TIMESTAMP: &str = "Received-Timestamp";
    pub const EVENT_ID: &str = "event_id";
    pub const PROJECT_ID: &str = "project_id";
    pub const GROUP_ID: &str = "group_id";
    pub const PRIMARY_HASH: &str = "primary_hash";
    pub const IS_NEW: &str = "is_new";
    pub const IS_REGRESSION: &str = "is_regression";
    pub const IS_NEW_GROUP_ENVIRONMENT: &str = "is_new_group_environment";
    pub const SKIP_CONSUME: &str = "skip_consume";
    pub const TRANSACTION_FORWARDER: &str = "transaction_forwarder";
    pub const GROUP_STATES: &str = "group_states";
}

/// An ordered, possibly-repeating set of byte-string headers, mirroring
/// the shape `rdkafka::message::OwnedHeaders` exposes (key + byte value,
/// no implied uniqueness). Kept encoding-agnostic here so the codec has
/// no direct dependency on `rdkafka`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageHeaders(Vec<(String, Vec<u8>)>);

impl MessageHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.0.push((key.into(), value.into()));
    }

    /// Returns only when present; a header that is absent is always
    /// semantically null, never empty-string (SPEC_FULL.md §4.1).
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub(crate) fn encode_bool(b: bool) -> &'static [u8] {
    if b {
        b"1"
    } else {
        b"0"
    }
}

pub(crate) fn decode_bool(raw: &[u8]) -> Option<bool> {
    match raw {
        b"1" => Some(true),
        b"0" => Some(false),
        _ => None,
    }
}
