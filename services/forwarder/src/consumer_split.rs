use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use eventpipe_batch::{CommitError, MessageSource, OffsetCommitter, TopicPartition};
use eventpipe_consumer::SynchronizedConsumer;
use tokio::sync::Mutex;

/// `BatchingHarness` takes its source and committer as two separately
/// owned values, but `SynchronizedConsumer` implements both traits on
/// one struct (it owns the single underlying `StreamConsumer` pair).
/// These two handles share one consumer behind a mutex so the harness
/// can hold what looks like two independent collaborators; the harness
/// never calls them concurrently; (`poll_next` is awaited, then either
/// nothing or a flush+commit happens before the next `poll_next`), so
/// the lock is never contended.
#[derive(Clone)]
pub struct SharedConsumer(Arc<Mutex<SynchronizedConsumer>>);

impl SharedConsumer {
    pub fn new(consumer: SynchronizedConsumer) -> (SourceHandle, CommitterHandle) {
        let shared = Self(Arc::new(Mutex::new(consumer)));
        (SourceHandle(shared.clone()), CommitterHandle(shared))
    }
}

pub struct SourceHandle(SharedConsumer);

#[async_trait]
impl MessageSource for SourceHandle {
    type Msg = rdkafka::message::OwnedMessage;

    async fn poll_next(&mut self) -> Option<(TopicPartition, i64, Self::Msg)> {
        self.0 .0.lock().await.poll_next().await
    }
}

pub struct CommitterHandle(SharedConsumer);

#[async_trait]
impl OffsetCommitter for CommitterHandle {
    async fn commit(&mut self, offsets: &HashMap<TopicPartition, i64>) -> Result<(), CommitError> {
        self.0 .0.lock().await.commit(offsets).await
    }
}
