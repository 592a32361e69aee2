/// Broker-level pause state for one assigned `(topic, partition)`
/// (SPEC_FULL.md §4.3). A partition starts `Paused` on assignment,
/// since its `remote_offset` is unknown until the commit log catches
/// up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionState {
    Running,
    Paused,
}

/// Per-partition offsets tracked by the synchronized consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offsets {
    /// Next offset to fetch on the data topic.
    pub local: i64,
    /// Highest offset observed on the commit log for the upstream
    /// group, for this partition. `None` until the first commit-log
    /// record referencing it arrives.
    pub remote: Option<i64>,
}

impl Offsets {
    /// Whether the partition is allowed to run given its current
    /// offsets (SPEC_FULL.md §4.3 step 2): local must be strictly
    /// behind the last-known remote commit.
    pub fn may_run(&self) -> bool {
        matches!(self.remote, Some(remote) if self.local < remote)
    }
}
