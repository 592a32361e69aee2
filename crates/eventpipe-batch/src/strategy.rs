use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlushError {
    #[error(transparent)]
    InvalidPayload(#[from] FlushInvalidPayload),
}

/// Wraps whatever decode error caused a flush to fail, without pulling a
/// dependency on `eventpipe-protocol` into this crate — the batch harness
/// is deliberately generic over the message/work-item types.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FlushInvalidPayload(pub String);

/// The per-entity-variant behavior a forwarder plugs into the shared
/// batching loop (SPEC_FULL.md §4.4/§4.5): classify-and-decode in
/// `process_message`, dispatch the accumulated batch in `flush_batch`.
///
/// `process_message` returning `None` means "this message contributes no
/// work" (SPEC_FULL.md §4.5) but its offset still advances on commit,
/// since the harness tracks offsets for every message it polls, not just
/// the ones that produced a work item.
#[async_trait]
pub trait ProcessingStrategy: Send + Sync {
    type Msg: Send + 'static;
    type WorkItem: Send + 'static;

    async fn process_message(&self, msg: &Self::Msg) -> Option<Self::WorkItem>;

    async fn flush_batch(&self, items: Vec<Self::WorkItem>) -> Result<(), FlushError>;
}
