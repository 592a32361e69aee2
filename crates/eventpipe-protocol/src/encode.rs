use crate::headers::{encode_bool, names, MessageHeaders};
use crate::types::{EventData, GroupState, TaskState};
use crate::version::Version;

/// Everything needed to encode one `insert` message, independent of which
/// encoding (body or headers) is chosen. Owned by the producer crate at
/// the call site of `publish`.
#[derive(Debug, Clone)]
pub struct InsertPayload {
    pub version: Version,
    pub event_id: String,
    pub project_id: i64,
    pub group_id: Option<i64>,
    pub primary_hash: Option<String>,
    pub is_new: Option<bool>,
    pub is_regression: Option<bool>,
    pub is_new_group_environment: Option<bool>,
    pub skip_consume: bool,
    pub transaction_forwarder: bool,
    pub group_states: Option<Vec<GroupState>>,
    pub received_timestamp: f64,
}

/// Body encoding: `[version, "insert", event_data, task_state]`.
pub fn encode_body(payload: &InsertPayload) -> Vec<u8> {
    let event_data = EventData {
        event_id: payload.event_id.clone(),
        project_id: payload.project_id,
        group_id: payload.group_id,
        primary_hash: payload.primary_hash.clone(),
    };
    let task_state = TaskState {
        is_new: payload.is_new,
        is_regression: payload.is_regression,
        is_new_group_environment: payload.is_new_group_environment,
        skip_consume: payload.skip_consume,
        transaction_forwarder: payload.transaction_forwarder,
        group_states: payload.group_states.clone(),
    };
    let body = (
        payload.version.as_i64(),
        "insert",
        event_data,
        task_state,
    );
    serde_json::to_vec(&body).expect("insert payload is always serializable")
}

/// Header encoding: scalar fields as byte strings, `operation`/`version`
/// always present, null-valued fields stripped (P2).
pub fn encode_headers(payload: &InsertPayload) -> MessageHeaders {
    let mut headers = MessageHeaders::new();
    headers.push(names::OPERATION, "insert");
    headers.push(names::VERSION, payload.version.as_i64().to_string());
    headers.push(
        names::RECEIVED_TIMESTAMP,
        payload.received_timestamp.to_string(),
    );
    headers.push(names::EVENT_ID, payload.event_id.clone());
    headers.push(names::PROJECT_ID, payload.project_id.to_string());
    if let Some(group_id) = payload.group_id {
        headers.push(names::GROUP_ID, group_id.to_string());
    }
    if let Some(primary_hash) = &payload.primary_hash {
        headers.push(names::PRIMARY_HASH, primary_hash.clone());
    }
    if let Some(is_new) = payload.is_new {
        headers.push(names::IS_NEW, encode_bool(is_new));
    }
    if let Some(is_regression) = payload.is_regression {
        headers.push(names::IS_REGRESSION, encode_bool(is_regression));
    }
    if let Some(is_new_group_environment) = payload.is_new_group_environment {
        headers.push(
            names::IS_NEW_GROUP_ENVIRONMENT,
            encode_bool(is_new_group_environment),
        );
    }
    headers.push(names::SKIP_CONSUME, encode_bool(payload.skip_consume));
    headers.push(
        names::TRANSACTION_FORWARDER,
        encode_bool(payload.transaction_forwarder),
    );
    if let Some(group_states) = &payload.group_states {
        let encoded =
            serde_json::to_string(group_states).expect("group_states is always serializable");
        headers.push(names::GROUP_STATES, encoded);
    }
    headers
}
