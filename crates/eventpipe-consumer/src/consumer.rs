use std::collections::HashMap;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use async_trait::async_trait;
use eventpipe_batch::{CommitError, MessageSource, OffsetCommitter, TopicPartition};
use rdkafka::consumer::{CommitMode, Consumer, DefaultConsumerContext, StreamConsumer};
use rdkafka::message::{Message, OwnedMessage};
use rdkafka::{ClientConfig, Offset, TopicPartitionList};
use tracing::{debug, warn};

use crate::commit_log::CommitLogRecord;
use crate::context::{RebalanceEvent, SyncContext};
use crate::pacer::Pacer;
use crate::state::PartitionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialOffsetReset {
    Latest,
    Earliest,
}

impl InitialOffsetReset {
    fn as_rdkafka_str(self) -> &'static str {
        match self {
            InitialOffsetReset::Latest => "latest",
            InitialOffsetReset::Earliest => "earliest",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SynchronizedConsumerConfig {
    pub brokers: String,
    pub data_topic: String,
    pub data_group: String,
    pub commit_log_topic: String,
    pub synchronize_commit_group: String,
    pub initial_offset_reset: InitialOffsetReset,
    pub backlog_capacity: usize,
}

/// Paces a data-topic consumer against a separate commit-log topic
/// (SPEC_FULL.md §4.3). Owns two `StreamConsumer`s: one reading the
/// commit log from `earliest` (so no history is lost across restarts),
/// one reading the paced data topic under normal group semantics.
pub struct SynchronizedConsumer {
    data: StreamConsumer<SyncContext>,
    commit_log: StreamConsumer<DefaultConsumerContext>,
    rebalance_events: std_mpsc::Receiver<RebalanceEvent>,
    pacer: Pacer,
    synchronize_commit_group: String,
    initial_offset_reset: InitialOffsetReset,
}

impl SynchronizedConsumer {
    pub fn new(config: SynchronizedConsumerConfig) -> Result<Self, rdkafka::error::KafkaError> {
        let (tx, rx) = std_mpsc::channel();

        let data: StreamConsumer<SyncContext> = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.data_group)
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .set("auto.offset.reset", config.initial_offset_reset.as_rdkafka_str())
            .create_with_context(SyncContext::new(tx))?;
        data.subscribe(&[config.data_topic.as_str()])?;

        let commit_log: StreamConsumer<DefaultConsumerContext> = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", format!("{}-commit-log", config.data_group))
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;
        commit_log.subscribe(&[config.commit_log_topic.as_str()])?;

        Ok(Self {
            data,
            commit_log,
            rebalance_events: rx,
            pacer: Pacer::new(config.backlog_capacity),
            synchronize_commit_group: config.synchronize_commit_group,
            initial_offset_reset: config.initial_offset_reset,
        })
    }

    /// Step 1 of the poll cycle (SPEC_FULL.md §4.3): drain whatever
    /// commit-log records are immediately available without blocking
    /// the data-topic fetch behind them.
    async fn drain_commit_log(&mut self) {
        loop {
            match tokio::time::timeout(Duration::from_millis(0), self.commit_log.recv()).await {
                Ok(Ok(msg)) => {
                    let Some(payload) = msg.payload() else { continue };
                    let Some(record) = CommitLogRecord::parse(payload) else { continue };
                    if record.group != self.synchronize_commit_group {
                        continue;
                    }
                    self.pacer.observe_commit(TopicPartition::new(record.topic, record.partition), record.offset);
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "commit-log recv error");
                    break;
                }
                Err(_) => break,
            }
        }
    }

    /// Applies any rebalance notifications queued by `SyncContext` since
    /// the last cycle, resolving each newly-assigned partition's
    /// starting local offset (SPEC_FULL.md §4.3 "Initial offset reset
    /// policy").
    fn drain_rebalance_events(&mut self) {
        while let Ok(event) = self.rebalance_events.try_recv() {
            match event {
                RebalanceEvent::Assigned(tpl) => {
                    for elem in tpl.elements() {
                        let partition = TopicPartition::new(elem.topic(), elem.partition());
                        let start = self.resolve_initial_offset(&partition).unwrap_or(0);
                        self.pacer.assign(partition, start);
                    }
                }
                RebalanceEvent::Revoked(tpl) => {
                    for elem in tpl.elements() {
                        self.pacer.revoke(&TopicPartition::new(elem.topic(), elem.partition()));
                    }
                }
            }
        }
    }

    fn resolve_initial_offset(&self, partition: &TopicPartition) -> Option<i64> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition(&partition.topic, partition.partition);
        match self.data.committed_offsets(tpl, Duration::from_secs(5)) {
            Ok(committed) => committed.elements().iter().find_map(|e| match e.offset() {
                Offset::Offset(o) => Some(o),
                _ => self.watermark_for_reset(partition),
            }),
            Err(err) => {
                warn!(error = %err, %partition, "failed to read committed offset, falling back to reset policy");
                self.watermark_for_reset(partition)
            }
        }
    }

    fn watermark_for_reset(&self, partition: &TopicPartition) -> Option<i64> {
        let (low, high) = self
            .data
            .fetch_watermarks(&partition.topic, partition.partition, Duration::from_secs(5))
            .ok()?;
        Some(match self.initial_offset_reset {
            InitialOffsetReset::Earliest => low,
            InitialOffsetReset::Latest => high,
        })
    }

    /// Step 2: pause/resume only the partitions whose state flipped
    /// this cycle (SPEC_FULL.md §4.3.1).
    fn reconcile_pause_state(&mut self) {
        let changed = self.pacer.reconcile();
        if changed.is_empty() {
            return;
        }
        let mut to_pause = TopicPartitionList::new();
        let mut to_resume = TopicPartitionList::new();
        for (partition, state) in changed {
            match state {
                PartitionState::Paused => {
                    to_pause.add_partition(&partition.topic, partition.partition);
                }
                PartitionState::Running => {
                    to_resume.add_partition(&partition.topic, partition.partition);
                }
            }
        }
        if !to_pause.elements().is_empty() {
            if let Err(err) = self.data.pause(&to_pause) {
                warn!(error = %err, "failed to pause partitions");
            }
        }
        if !to_resume.elements().is_empty() {
            if let Err(err) = self.data.resume(&to_resume) {
                warn!(error = %err, "failed to resume partitions");
            }
        }
    }
}

#[async_trait]
impl MessageSource for SynchronizedConsumer {
    type Msg = OwnedMessage;

    async fn poll_next(&mut self) -> Option<(TopicPartition, i64, Self::Msg)> {
        self.drain_commit_log().await;
        self.drain_rebalance_events();
        self.reconcile_pause_state();

        match tokio::time::timeout(Duration::from_millis(200), self.data.recv()).await {
            Ok(Ok(msg)) => {
                let partition = TopicPartition::new(msg.topic(), msg.partition());
                let offset = msg.offset();
                self.pacer.advance_local(&partition, offset);
                Some((partition, offset, msg.detach()))
            }
            Ok(Err(err)) => {
                warn!(error = %err, "data consumer recv error");
                None
            }
            Err(_) => {
                debug!("poll tick elapsed with nothing to deliver");
                None
            }
        }
    }
}

#[async_trait]
impl OffsetCommitter for SynchronizedConsumer {
    async fn commit(&mut self, offsets: &HashMap<TopicPartition, i64>) -> Result<(), CommitError> {
        let mut tpl = TopicPartitionList::new();
        for (partition, &offset) in offsets {
            tpl.add_partition_offset(&partition.topic, partition.partition, Offset::Offset(offset))
                .map_err(|err| CommitError::Failed(err.to_string()))?;
        }
        self.data
            .commit(&tpl, CommitMode::Sync)
            .map_err(|err| CommitError::Failed(err.to_string()))
    }
}
