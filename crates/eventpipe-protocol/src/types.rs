use serde::{Deserialize, Serialize};

/// One element of `group_states`: the post-processing disposition of a
/// single group affected by an insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    pub id: i64,
    #[serde(default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub is_regression: Option<bool>,
    #[serde(default)]
    pub is_new_group_environment: Option<bool>,
}

/// `event_data` in the body encoding: the fields that identify the event
/// and the group it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub event_id: String,
    pub project_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub primary_hash: Option<String>,
}

/// `task_state` in the body encoding: everything else needed to decide
/// whether and how to dispatch post-processing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskState {
    #[serde(default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub is_regression: Option<bool>,
    #[serde(default)]
    pub is_new_group_environment: Option<bool>,
    #[serde(default)]
    pub skip_consume: bool,
    #[serde(default)]
    pub transaction_forwarder: bool,
    #[serde(default)]
    pub group_states: Option<Vec<GroupState>>,
}

/// The decoded dispatch record: what a forwarder hands to the task queue
/// for a qualifying insert. This is the "equal dispatch kwargs" both wire
/// encodings must agree on (P1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub event_id: String,
    pub project_id: i64,
    pub group_id: Option<i64>,
    pub primary_hash: Option<String>,
    pub is_new: Option<bool>,
    pub is_regression: Option<bool>,
    pub is_new_group_environment: Option<bool>,
    pub group_states: Option<Vec<GroupState>>,
    /// Present only when decoded from headers mode (the body encoding has
    /// no dedicated slot for it). Excluded from the P1 equality check.
    #[serde(default)]
    pub received_timestamp: Option<f64>,
}

/// Why a message was dropped without dispatching work. Logged, never
/// propagated as an error — distinct from the three `DecodeError`
/// variants, which do propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SkipConsume,
    UnsupportedOperation,
}

/// Outcome of decoding one message. The tagged-result replacement for the
/// source's exceptions-as-control-flow (see SPEC_FULL.md §9).
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Dispatch(TaskInput),
    Skip(SkipReason),
}
