//! End-to-end coverage of the three forwarder variants against the
//! concrete scenarios in SPEC_FULL.md §8 (scenarios 1 and 2, property
//! P6).

use std::sync::Arc;

use eventpipe_protocol::{cache_key_for_event, header_names};
use eventpipe_queue::{InProcessTaskQueue, PostProcessKwargs};
use forwarder::{Entity, ForwarderStrategy};
use rdkafka::message::{Header, OwnedHeaders, OwnedMessage};

fn body_insert(transaction_header: Option<&str>) -> OwnedMessage {
    let value = serde_json::to_vec(&serde_json::json!([
        2,
        "insert",
        {"event_id": "fe0ee9a2bc3b415497bad68aaf70dc7f", "project_id": 1, "group_id": 43, "primary_hash": "311ee66a5b8e697929804ceb1c456ffe"},
        {"is_new": false, "is_regression": null, "is_new_group_environment": false, "group_states": [{"id": 43, "is_new": false, "is_regression": null, "is_new_group_environment": false}]}
    ]))
    .unwrap();

    let headers = transaction_header.map(|v| {
        OwnedHeaders::new().insert(Header {
            key: header_names::TRANSACTION_FORWARDER,
            value: Some(v.as_bytes()),
        })
    });

    OwnedMessage::new(Some(value), None, "events".to_owned(), rdkafka::Timestamp::NotAvailable, 0, 0, headers)
}

/// Scenario 1: a body-form v2 insert with no headers dispatches through
/// the errors-variant with the expected kwargs and cache key.
#[tokio::test]
async fn happy_path_error_dispatches_with_expected_kwargs() {
    let (queue, mut rx) = InProcessTaskQueue::new();
    let strategy = ForwarderStrategy::new(Entity::Errors, Arc::new(queue), 4);

    let msg = body_insert(None);
    let item = strategy.process_message(&msg).await.expect("errors-variant should dispatch");
    strategy.flush_batch(vec![item]).await.unwrap();

    let task = rx.recv().await.unwrap();
    let kwargs: PostProcessKwargs = serde_json::from_value(task.kwargs).unwrap();
    assert_eq!(kwargs.event_id, "fe0ee9a2bc3b415497bad68aaf70dc7f");
    assert_eq!(kwargs.project_id, 1);
    assert_eq!(kwargs.group_id, Some(43));
    assert_eq!(kwargs.primary_hash.as_deref(), Some("311ee66a5b8e697929804ceb1c456ffe"));
    assert_eq!(kwargs.is_new, Some(false));
    assert_eq!(kwargs.is_new_group_environment, Some(false));
    assert_eq!(kwargs.cache_key, cache_key_for_event(1, "fe0ee9a2bc3b415497bad68aaf70dc7f"));
}

/// Scenario 2: with `transaction_forwarder = "1"`, the errors-variant
/// drops the message (no work item) and the transactions-variant
/// dispatches it identically to scenario 1.
#[tokio::test]
async fn transaction_header_routes_between_variants() {
    let (errors_queue, _errors_rx) = InProcessTaskQueue::new();
    let errors_strategy = ForwarderStrategy::new(Entity::Errors, Arc::new(errors_queue), 4);
    let msg = body_insert(Some("1"));
    assert!(errors_strategy.process_message(&msg).await.is_none());

    let (tx_queue, mut tx_rx) = InProcessTaskQueue::new();
    let tx_strategy = ForwarderStrategy::new(Entity::Transactions, Arc::new(tx_queue), 4);
    let item = tx_strategy.process_message(&msg).await.expect("transactions-variant should dispatch");
    tx_strategy.flush_batch(vec![item]).await.unwrap();

    let task = tx_rx.recv().await.unwrap();
    let kwargs: PostProcessKwargs = serde_json::from_value(task.kwargs).unwrap();
    assert_eq!(kwargs.event_id, "fe0ee9a2bc3b415497bad68aaf70dc7f");
}

/// P6: the all-variant dispatches regardless of the header.
#[tokio::test]
async fn all_variant_ignores_classification() {
    let (queue, mut rx) = InProcessTaskQueue::new();
    let strategy = ForwarderStrategy::new(Entity::All, Arc::new(queue), 4);

    for header in [None, Some("0"), Some("1")] {
        let msg = body_insert(header);
        let item = strategy.process_message(&msg).await.expect("all-variant dispatches every insert");
        strategy.flush_batch(vec![item]).await.unwrap();
        assert!(rx.recv().await.is_some());
    }
}
