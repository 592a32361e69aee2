//! Property-style coverage for the wire codec (SPEC_FULL.md §8: P1-P4 plus
//! the concrete happy-path/transaction/malformed-headers/unknown-version
//! scenarios). The state spaces here are small enough to enumerate by
//! hand rather than pull in a property-testing crate.

use eventpipe_protocol::{
    decode, encode_body, encode_headers, DecodeError, DecodeOutcome, GroupState, InsertPayload,
    RawMessage, SkipReason, Version,
};

fn sample_payload(skip_consume: bool, transaction_forwarder: bool) -> InsertPayload {
    InsertPayload {
        version: Version::V2,
        event_id: "fe0ee9a2bc3b415497bad68aaf70dc7f".into(),
        project_id: 1,
        group_id: Some(43),
        primary_hash: Some("311ee66a5b8e697929804ceb1c456ffe".into()),
        is_new: Some(false),
        is_regression: None,
        is_new_group_environment: Some(false),
        skip_consume,
        transaction_forwarder,
        group_states: Some(vec![GroupState {
            id: 43,
            is_new: Some(false),
            is_regression: None,
            is_new_group_environment: Some(false),
        }]),
        received_timestamp: 1_700_000_000.5,
    }
}

// P1: headers-mode and body-mode decode of the same insert agree, modulo
// `received_timestamp` (body-mode has no slot for it).
#[test]
fn p1_headers_and_body_round_trip_agree() {
    let payload = sample_payload(false, false);

    let body_bytes = encode_body(&payload);
    let body_msg = RawMessage {
        headers: None,
        value: &body_bytes,
    };
    let DecodeOutcome::Dispatch(from_body) = decode(&body_msg).unwrap() else {
        panic!("expected dispatch from body")
    };

    let headers = encode_headers(&payload);
    let header_msg = RawMessage {
        headers: Some(&headers),
        value: b"",
    };
    let DecodeOutcome::Dispatch(mut from_headers) = decode(&header_msg).unwrap() else {
        panic!("expected dispatch from headers")
    };
    from_headers.received_timestamp = None;

    assert_eq!(from_body, from_headers);
}

// P2: null stripping. `group_id`/`primary_hash`/`is_regression` are null
// here, so none of their headers should be written, and decoding back
// reconstructs the nulls.
#[test]
fn p2_null_fields_are_stripped_then_reconstructed() {
    let mut payload = sample_payload(false, false);
    payload.group_id = None;
    payload.primary_hash = None;
    payload.is_regression = None;
    payload.is_new_group_environment = None;

    let headers = encode_headers(&payload);
    assert!(headers.get(eventpipe_protocol::header_names::GROUP_ID).is_none());
    assert!(headers
        .get(eventpipe_protocol::header_names::PRIMARY_HASH)
        .is_none());
    assert!(headers
        .get(eventpipe_protocol::header_names::IS_REGRESSION)
        .is_none());
    assert!(headers
        .get(eventpipe_protocol::header_names::IS_NEW_GROUP_ENVIRONMENT)
        .is_none());

    let msg = RawMessage {
        headers: Some(&headers),
        value: b"",
    };
    let DecodeOutcome::Dispatch(decoded) = decode(&msg).unwrap() else {
        panic!("expected dispatch")
    };
    assert_eq!(decoded.group_id, None);
    assert_eq!(decoded.primary_hash, None);
    assert_eq!(decoded.is_regression, None);
    assert_eq!(decoded.is_new_group_environment, None);
}

// P3: skip_consume short-circuits to Skip regardless of encoding.
#[test]
fn p3_skip_consume_yields_skip_in_both_encodings() {
    let payload = sample_payload(true, false);

    let body_bytes = encode_body(&payload);
    let body_msg = RawMessage {
        headers: None,
        value: &body_bytes,
    };
    assert_eq!(
        decode(&body_msg).unwrap(),
        DecodeOutcome::Skip(SkipReason::SkipConsume)
    );

    let headers = encode_headers(&payload);
    let header_msg = RawMessage {
        headers: Some(&headers),
        value: b"",
    };
    assert_eq!(
        decode(&header_msg).unwrap(),
        DecodeOutcome::Skip(SkipReason::SkipConsume)
    );
}

// P4: version gating, enumerated per version.
#[test]
fn p4_unsupported_operations_are_dropped_silently() {
    for (version, op) in [(1i64, "delete"), (1, "merge"), (2, "tombstone_events"), (2, "replace_group")] {
        let body = serde_json::to_vec(&(version, op, serde_json::Value::Null, serde_json::Value::Null)).unwrap();
        let msg = RawMessage {
            headers: None,
            value: &body,
        };
        assert_eq!(
            decode(&msg).unwrap(),
            DecodeOutcome::Skip(SkipReason::UnsupportedOperation),
            "operation {op} on v{version} should be dropped"
        );
    }
}

#[test]
fn p4_other_non_insert_operations_raise_unexpected_operation() {
    let body = serde_json::to_vec(&(2i64, "some_future_op", serde_json::Value::Null, serde_json::Value::Null))
        .unwrap();
    let msg = RawMessage {
        headers: None,
        value: &body,
    };
    match decode(&msg) {
        Err(DecodeError::UnexpectedOperation { operation, version }) => {
            assert_eq!(operation, "some_future_op");
            assert_eq!(version, Version::V2);
        }
        other => panic!("expected UnexpectedOperation, got {other:?}"),
    }
}

// Scenario 4: unknown version fails the whole decode.
#[test]
fn scenario_unknown_version_fails_decode() {
    let body = serde_json::to_vec(&(100i64, "insert", serde_json::Value::Null, serde_json::Value::Null))
        .unwrap();
    let msg = RawMessage {
        headers: None,
        value: &body,
    };
    assert_eq!(decode(&msg), Err(DecodeError::InvalidVersion { version: 100 }));
}

// Scenario 3: malformed headers with no "operation" key fall back to the
// body, which still decodes cleanly.
#[test]
fn scenario_malformed_headers_fall_back_to_body() {
    let payload = sample_payload(false, false);
    let body_bytes = encode_body(&payload);

    let mut junk_headers = eventpipe_protocol::MessageHeaders::new();
    junk_headers.push("not-a-real-header", vec![0xff, 0xfe, 0x00]);

    let msg = RawMessage {
        headers: Some(&junk_headers),
        value: &body_bytes,
    };
    let DecodeOutcome::Dispatch(decoded) = decode(&msg).unwrap() else {
        panic!("expected dispatch")
    };
    assert_eq!(decoded.event_id, payload.event_id);
    assert_eq!(decoded.project_id, payload.project_id);
}

// Scenario 1: happy-path error dispatch kwargs match exactly.
#[test]
fn scenario_happy_path_error_dispatch() {
    let payload = sample_payload(false, false);
    let body_bytes = encode_body(&payload);
    let msg = RawMessage {
        headers: None,
        value: &body_bytes,
    };
    let DecodeOutcome::Dispatch(decoded) = decode(&msg).unwrap() else {
        panic!("expected dispatch")
    };
    assert_eq!(decoded.event_id, "fe0ee9a2bc3b415497bad68aaf70dc7f");
    assert_eq!(decoded.project_id, 1);
    assert_eq!(decoded.group_id, Some(43));
    assert_eq!(
        decoded.primary_hash.as_deref(),
        Some("311ee66a5b8e697929804ceb1c456ffe")
    );
    assert_eq!(decoded.is_new, Some(false));
    assert_eq!(decoded.is_regression, None);
    assert_eq!(decoded.is_new_group_environment, Some(false));
    assert_eq!(decoded.group_states.as_ref().unwrap().len(), 1);
}

// Malformed group_states JSON must not fail the whole decode.
#[test]
fn malformed_group_states_header_degrades_to_null() {
    let payload = sample_payload(false, false);
    let mut headers = encode_headers(&payload);
    // Overwrite with garbage by rebuilding the header set.
    let mut rebuilt = eventpipe_protocol::MessageHeaders::new();
    for (k, v) in headers.iter() {
        if k == eventpipe_protocol::header_names::GROUP_STATES {
            rebuilt.push(k, b"not json".to_vec());
        } else {
            rebuilt.push(k, v.to_vec());
        }
    }
    headers = rebuilt;

    let msg = RawMessage {
        headers: Some(&headers),
        value: b"",
    };
    let DecodeOutcome::Dispatch(decoded) = decode(&msg).unwrap() else {
        panic!("expected dispatch despite malformed group_states")
    };
    assert_eq!(decoded.group_states, None);
    assert_eq!(decoded.event_id, payload.event_id);
}
