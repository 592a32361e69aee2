use std::time::Duration;

use thiserror::Error;

use crate::shutdown::ShutdownFlag;
use crate::source::{CommitError, MessageSource, OffsetCommitter};
use crate::strategy::{FlushError, ProcessingStrategy};
use crate::types::Batch;

#[derive(Debug, Clone, Copy)]
pub struct BatchingHarnessConfig {
    pub max_batch_size: usize,
    pub max_batch_time: Duration,
    pub commit_on_shutdown: bool,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("flush failed: {0}")]
    Flush(#[from] FlushError),
    #[error("commit failed: {0}")]
    Commit(#[from] CommitError),
}

/// Drives a worker over the consumer (SPEC_FULL.md §4.4): polls, feeds
/// qualifying messages into the current batch, flushes on size/age,
/// commits one-past-highest offsets, and honors cooperative shutdown.
pub struct BatchingHarness<S, C, P>
where
    S: MessageSource,
    C: OffsetCommitter,
    P: ProcessingStrategy<Msg = S::Msg>,
{
    source: S,
    committer: C,
    strategy: P,
    config: BatchingHarnessConfig,
    shutdown: ShutdownFlag,
}

impl<S, C, P> BatchingHarness<S, C, P>
where
    S: MessageSource,
    C: OffsetCommitter,
    P: ProcessingStrategy<Msg = S::Msg>,
{
    pub fn new(
        source: S,
        committer: C,
        strategy: P,
        config: BatchingHarnessConfig,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            source,
            committer,
            strategy,
            config,
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<(), HarnessError> {
        let poll_tick = (self.config.max_batch_time / 4).max(Duration::from_millis(10));
        let mut batch: Batch<P::WorkItem> = Batch::new(self.config.max_batch_size, self.config.max_batch_time);

        loop {
            if self.shutdown.is_set() {
                break;
            }

            tokio::select! {
                biased;
                () = self.shutdown.wait() => break,
                polled = tokio::time::timeout(poll_tick, self.source.poll_next()) => {
                    if let Ok(Some((partition, offset, msg))) = polled {
                        match self.strategy.process_message(&msg).await {
                            Some(item) => batch.push(partition, offset, item),
                            None => batch.note_offset(partition, offset),
                        }
                    }
                }
            }

            if batch.should_flush() {
                self.flush_and_commit(&mut batch).await?;
            }
        }

        if !batch.is_empty() || self.config.commit_on_shutdown {
            self.flush_and_commit(&mut batch).await?;
        }
        Ok(())
    }

    async fn flush_and_commit(&mut self, batch: &mut Batch<P::WorkItem>) -> Result<(), HarnessError> {
        if batch.is_empty() {
            return Ok(());
        }
        let offsets = batch.commit_offsets();
        let items = batch.take_items();
        self.strategy.flush_batch(items).await?;
        self.committer.commit(&offsets).await?;
        *batch = Batch::new(self.config.max_batch_size, self.config.max_batch_time);
        Ok(())
    }
}
