use std::collections::HashSet;

/// One element of the rebind arena (SPEC_FULL.md §3.1): re-resolved by
/// id on every access, never owned across entity boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub organization_id: i64,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: i64,
    pub slug: String,
    pub feature_flags: HashSet<String>,
}

impl Organization {
    pub fn has_feature(&self, flag: &str) -> bool {
        self.feature_flags.contains(flag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Unresolved,
    Ignored,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub project_id: i64,
    pub status: GroupStatus,
    pub times_seen: u64,
    /// Buffered `times_seen` increments not yet flushed to storage,
    /// attached by the rebind step (SPEC_FULL.md §4.7 step 3).
    pub times_seen_pending: u64,
}

impl Group {
    pub fn effective_times_seen(&self) -> u64 {
        self.times_seen + self.times_seen_pending
    }
}

/// The full event body loaded from the event processing store by
/// `cache_key` (SPEC_FULL.md §4.7 step 1) — distinct from the enqueue
/// kwargs, which carry only enough to look this up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBody {
    pub event_id: String,
    pub project_id: i64,
    pub is_transaction: bool,
    pub is_reprocessed: bool,
}

/// Per-event record handed to the pipeline (SPEC_FULL.md §3): `event`
/// and `group_state` are immutable; `has_reappeared` and `has_alert`
/// are mutated by stages as they run.
#[derive(Debug, Clone)]
pub struct PostProcessJob {
    pub event: EventBody,
    pub group_state: eventpipe_protocol::GroupState,
    pub is_reprocessed: bool,
    pub has_reappeared: bool,
    pub has_alert: bool,
}

impl PostProcessJob {
    pub fn group_id(&self) -> i64 {
        self.group_state.id
    }
}

/// One row of the `GroupOwner` table the owner-reconciliation stage
/// maintains (SPEC_FULL.md §4.7 stage 4).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupOwnerRow {
    pub kind: OwnerKind,
    pub id: i64,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Team,
    User,
}

/// Reason a group is added to the inbox (SPEC_FULL.md §4.7 stage 3 /
/// stage 2's UNIGNORED emission).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxReason {
    Reprocessed,
    New,
    Regression,
    Unignored,
}
