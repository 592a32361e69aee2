use std::sync::mpsc;

use rdkafka::client::ClientContext;
use rdkafka::consumer::{ConsumerContext, Rebalance};
use rdkafka::TopicPartitionList;
use tracing::{info, warn};

/// One rebalance event surfaced to the poll-loop task (SPEC_FULL.md
/// §4.3.1) — `pre_rebalance`/`post_rebalance` run on librdkafka's
/// internal callback thread, so they hand assignment/revocation off
/// through a channel rather than touching `Pacer` directly.
#[derive(Debug, Clone)]
pub enum RebalanceEvent {
    Assigned(TopicPartitionList),
    Revoked(TopicPartitionList),
}

/// `ConsumerContext` for the data consumer, implementing the rebalance
/// hooks SPEC_FULL.md §4.3.1 calls for. Mirrors the teacher-adjacent
/// pattern of a minimal context struct that just logs and forwards.
pub struct SyncContext {
    events: mpsc::Sender<RebalanceEvent>,
}

impl SyncContext {
    pub fn new(events: mpsc::Sender<RebalanceEvent>) -> Self {
        Self { events }
    }
}

impl ClientContext for SyncContext {}

impl ConsumerContext for SyncContext {
    fn pre_rebalance(&self, rebalance: &Rebalance) {
        if let Rebalance::Revoke(tpl) = rebalance {
            info!(?rebalance, "rebalance: revoking partitions");
            if self.events.send(RebalanceEvent::Revoked(tpl.clone())).is_err() {
                warn!("rebalance event dropped: poll loop gone");
            }
        }
    }

    fn post_rebalance(&self, rebalance: &Rebalance) {
        if let Rebalance::Assign(tpl) = rebalance {
            info!(?rebalance, "rebalance: assigned partitions");
            if self.events.send(RebalanceEvent::Assigned(tpl.clone())).is_err() {
                warn!("rebalance event dropped: poll loop gone");
            }
        }
    }
}
