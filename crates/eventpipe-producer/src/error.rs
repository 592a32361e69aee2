use thiserror::Error;

/// Delivery failures are logged and swallowed at the call site of
/// `publish` (SPEC_FULL.md §4.2/§7) — correctness is guaranteed
/// downstream by idempotency, not by delivery. This type exists so the
/// internal delivery-reporting task has something typed to log; it is
/// never returned from `publish`.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("kafka delivery failed: {0}")]
    Kafka(String),
    #[error("kafka enqueue failed: {0}")]
    Enqueue(String),
}
