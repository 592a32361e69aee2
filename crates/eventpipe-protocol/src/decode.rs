use crate::error::DecodeError;
use crate::headers::{names, MessageHeaders};
use crate::types::{DecodeOutcome, EventData, GroupState, SkipReason, TaskInput, TaskState};
use crate::version::Version;

/// A message as handed to the decoder: possibly-present headers plus the
/// (possibly opaque, when headers are authoritative) value bytes.
#[derive(Debug, Clone)]
pub struct RawMessage<'a> {
    pub headers: Option<&'a MessageHeaders>,
    pub value: &'a [u8],
}

/// Decodes one message per SPEC_FULL.md §4.1. Headers take precedence
/// over the body whenever an `operation` header is present; otherwise
/// the body array is the source of truth.
pub fn decode(msg: &RawMessage<'_>) -> Result<DecodeOutcome, DecodeError> {
    match msg.headers {
        Some(headers) if headers.get(names::OPERATION).is_some() => decode_headers(headers),
        _ => decode_body(msg.value),
    }
}

fn decode_headers(headers: &MessageHeaders) -> Result<DecodeOutcome, DecodeError> {
    let operation = headers
        .get_str(names::OPERATION)
        .ok_or_else(|| DecodeError::InvalidPayload("missing operation header".into()))?
        .to_owned();

    let version = parse_version_header(headers)?;

    if operation != "insert" {
        return classify_non_insert(version, &operation);
    }

    let event_id = headers
        .get_str(names::EVENT_ID)
        .ok_or_else(|| DecodeError::InvalidPayload("missing event_id header".into()))?
        .to_owned();
    let project_id = headers
        .get_str(names::PROJECT_ID)
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| DecodeError::InvalidPayload("missing/invalid project_id header".into()))?;
    let group_id = headers
        .get_str(names::GROUP_ID)
        .and_then(|s| s.parse::<i64>().ok());
    let primary_hash = headers.get_str(names::PRIMARY_HASH).map(str::to_owned);
    let is_new = headers
        .get(names::IS_NEW)
        .and_then(crate::headers::decode_bool);
    let is_regression = headers
        .get(names::IS_REGRESSION)
        .and_then(crate::headers::decode_bool);
    let is_new_group_environment = headers
        .get(names::IS_NEW_GROUP_ENVIRONMENT)
        .and_then(crate::headers::decode_bool);
    let skip_consume = headers
        .get(names::SKIP_CONSUME)
        .and_then(crate::headers::decode_bool)
        .unwrap_or(false);
    let received_timestamp = headers
        .get_str(names::RECEIVED_TIMESTAMP)
        .and_then(|s| s.parse::<f64>().ok());
    let group_states = parse_group_states_header(headers);

    if skip_consume {
        return Ok(DecodeOutcome::Skip(SkipReason::SkipConsume));
    }

    Ok(DecodeOutcome::Dispatch(TaskInput {
        event_id,
        project_id,
        group_id,
        primary_hash,
        is_new,
        is_regression,
        is_new_group_environment,
        group_states,
        received_timestamp,
    }))
}

/// Malformed `group_states` JSON must not fail the decode (SPEC_FULL.md
/// §4.1); it is logged and the rest of the record decodes normally.
fn parse_group_states_header(headers: &MessageHeaders) -> Option<Vec<GroupState>> {
    let raw = headers.get_str(names::GROUP_STATES)?;
    match serde_json::from_str::<Vec<GroupState>>(raw) {
        Ok(states) => Some(states),
        Err(err) => {
            tracing::warn!(error = %err, raw, "malformed group_states header, treating as null");
            None
        }
    }
}

fn parse_version_header(headers: &MessageHeaders) -> Result<Version, DecodeError> {
    let raw = headers
        .get_str(names::VERSION)
        .ok_or_else(|| DecodeError::InvalidPayload("missing version header".into()))?;
    let raw_i64 = raw
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidPayload(format!("non-numeric version header: {raw}")))?;
    Version::from_i64(raw_i64).ok_or(DecodeError::InvalidVersion { version: raw_i64 })
}

fn decode_body(value: &[u8]) -> Result<DecodeOutcome, DecodeError> {
    let raw: serde_json::Value = serde_json::from_slice(value)
        .map_err(|e| DecodeError::InvalidPayload(format!("body is not valid JSON: {e}")))?;
    let arr = raw
        .as_array()
        .ok_or_else(|| DecodeError::InvalidPayload("body is not a JSON array".into()))?;
    if arr.len() < 2 {
        return Err(DecodeError::InvalidPayload(
            "body array too short for [version, operation, ...]".into(),
        ));
    }

    let raw_version = arr[0]
        .as_i64()
        .ok_or_else(|| DecodeError::InvalidPayload("body[0] is not an integer version".into()))?;
    let version = Version::from_i64(raw_version).ok_or(DecodeError::InvalidVersion {
        version: raw_version,
    })?;

    let operation = arr[1]
        .as_str()
        .ok_or_else(|| DecodeError::InvalidPayload("body[1] is not a string operation".into()))?
        .to_owned();

    if operation != "insert" {
        return classify_non_insert(version, &operation);
    }

    if arr.len() < 4 {
        return Err(DecodeError::InvalidPayload(
            "insert body missing event_data/task_state".into(),
        ));
    }
    let event_data: EventData = serde_json::from_value(arr[2].clone())
        .map_err(|e| DecodeError::InvalidPayload(format!("invalid event_data: {e}")))?;
    let task_state: TaskState = serde_json::from_value(arr[3].clone())
        .map_err(|e| DecodeError::InvalidPayload(format!("invalid task_state: {e}")))?;

    if task_state.skip_consume {
        return Ok(DecodeOutcome::Skip(SkipReason::SkipConsume));
    }

    Ok(DecodeOutcome::Dispatch(TaskInput {
        event_id: event_data.event_id,
        project_id: event_data.project_id,
        group_id: event_data.group_id,
        primary_hash: event_data.primary_hash,
        is_new: task_state.is_new,
        is_regression: task_state.is_regression,
        is_new_group_environment: task_state.is_new_group_environment,
        group_states: task_state.group_states,
        received_timestamp: None,
    }))
}

fn classify_non_insert(version: Version, operation: &str) -> Result<DecodeOutcome, DecodeError> {
    if version.is_unsupported(operation) {
        tracing::info!(operation, %version, "dropping unsupported operation");
        Ok(DecodeOutcome::Skip(SkipReason::UnsupportedOperation))
    } else {
        Err(DecodeError::UnexpectedOperation {
            operation: operation.to_owned(),
            version,
        })
    }
}
