use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::TopicPartition;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("commit failed: {0}")]
    Failed(String),
}

/// Everything the batching harness needs from the underlying consumer:
/// a way to pull the next message (or learn the poll tick elapsed with
/// nothing ready), and a way to commit offsets once a batch flushes
/// successfully. Implemented by `eventpipe-consumer`'s synchronized
/// consumer; kept as a trait here so the harness has no direct
/// dependency on `rdkafka`.
#[async_trait]
pub trait MessageSource: Send {
    type Msg: Send + 'static;

    /// Returns the next message and its `(topic, partition, offset)`, or
    /// `None` if the poll tick elapsed with nothing to deliver.
    async fn poll_next(&mut self) -> Option<(TopicPartition, i64, Self::Msg)>;
}

#[async_trait]
pub trait OffsetCommitter: Send {
    async fn commit(&mut self, offsets: &HashMap<TopicPartition, i64>) -> Result<(), CommitError>;
}
