//! Synchronized consumer (SPEC_FULL.md §4.3): paces a data-topic
//! consumer against a separate commit-log topic so that no message is
//! delivered ahead of the point an upstream group has already
//! committed past it.

mod commit_log;
mod consumer;
mod context;
mod pacer;
mod state;

pub use commit_log::CommitLogRecord;
pub use consumer::{InitialOffsetReset, SynchronizedConsumer, SynchronizedConsumerConfig};
pub use context::{RebalanceEvent, SyncContext};
pub use pacer::Pacer;
pub use state::{Offsets, PartitionState};
