use serde::Deserialize;

/// Wire shape of a commit-log record (SPEC_FULL.md §4.3): published
/// whenever the upstream group advances its committed offset for a
/// `(topic, partition)`. `offset` is the first offset the upstream
/// group has *not yet* consumed, i.e. the value this consumer paces
/// against directly.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitLogRecord {
    pub group: String,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl CommitLogRecord {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match serde_json::from_slice(payload) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed commit-log record");
                None
            }
        }
    }
}
