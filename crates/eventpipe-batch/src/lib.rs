//! Batching worker harness (SPEC_FULL.md §4.4): drives a consumer,
//! accumulates work into bounded batches, flushes on size or time,
//! commits after successful flush, and coordinates graceful shutdown.
//!
//! Deliberately generic over the message and work-item types so it can
//! be shared across all three forwarder variants (SPEC_FULL.md §4.5).

mod harness;
mod shutdown;
mod source;
mod strategy;
mod types;

pub use harness::{BatchingHarness, BatchingHarnessConfig, HarnessError};
pub use shutdown::{install_signal_handlers, ShutdownFlag};
pub use source::{CommitError, MessageSource, OffsetCommitter};
pub use strategy::{FlushError, FlushInvalidPayload, ProcessingStrategy};
pub use types::{Batch, TopicPartition};
