use std::sync::Arc;

use async_trait::async_trait;
use eventpipe_batch::{FlushError, FlushInvalidPayload, ProcessingStrategy};
use eventpipe_protocol::{cache_key_for_event, decode, DecodeError, DecodeOutcome, MessageHeaders, RawMessage, TaskInput};
use eventpipe_queue::{EnqueueError, PostProcessKwargs, Task, TaskQueue};
use futures::stream::{self, StreamExt};
use rdkafka::message::{Message, OwnedMessage};
use tracing::warn;

use crate::classify::Entity;

fn owned_headers_to_message_headers(msg: &OwnedMessage) -> Option<MessageHeaders> {
    let headers = msg.headers()?;
    let mut out = MessageHeaders::new();
    for i in 0..headers.count() {
        let header = headers.get(i);
        if let Some(value) = header.value {
            out.push(header.key, value.to_vec());
        }
    }
    Some(out)
}

/// One `ProcessingStrategy` shared by all three entity variants
/// (SPEC_FULL.md §4.5): the body is identical, only `entity`'s
/// classification predicate differs.
pub struct ForwarderStrategy {
    entity: Entity,
    task_queue: Arc<dyn TaskQueue>,
    concurrency: usize,
}

impl ForwarderStrategy {
    pub fn new(entity: Entity, task_queue: Arc<dyn TaskQueue>, concurrency: usize) -> Self {
        Self {
            entity,
            task_queue,
            concurrency: concurrency.max(1),
        }
    }

    fn into_kwargs(task_input: TaskInput) -> PostProcessKwargs {
        let cache_key = cache_key_for_event(task_input.project_id, &task_input.event_id);
        PostProcessKwargs {
            event_id: task_input.event_id,
            project_id: task_input.project_id,
            group_id: task_input.group_id,
            primary_hash: task_input.primary_hash,
            is_new: task_input.is_new,
            is_regression: task_input.is_regression,
            is_new_group_environment: task_input.is_new_group_environment,
            group_states: task_input.group_states,
            cache_key,
        }
    }
}

#[async_trait]
impl ProcessingStrategy for ForwarderStrategy {
    type Msg = OwnedMessage;
    type WorkItem = Result<TaskInput, DecodeError>;

    async fn process_message(&self, msg: &Self::Msg) -> Option<Self::WorkItem> {
        if !self.entity.accepts(msg) {
            return None;
        }

        let headers = owned_headers_to_message_headers(msg);
        let value = msg.payload().unwrap_or(&[]);
        let raw = RawMessage {
            headers: headers.as_ref(),
            value,
        };

        match decode(&raw) {
            Ok(DecodeOutcome::Dispatch(task_input)) => Some(Ok(task_input)),
            Ok(DecodeOutcome::Skip(reason)) => {
                tracing::debug!(?reason, "dropping message");
                None
            }
            Err(err) => Some(Err(err)),
        }
    }

    /// Enqueues one post-process task per batch item (SPEC_FULL.md §4.5);
    /// a single decode error anywhere in the batch fails the whole flush
    /// so the batch is not committed (§7). Dispatch itself fans out over
    /// a bounded `concurrency` of concurrent enqueues (§5.1).
    async fn flush_batch(&self, items: Vec<Self::WorkItem>) -> Result<(), FlushError> {
        let mut task_inputs = Vec::with_capacity(items.len());
        for item in items {
            task_inputs.push(item.map_err(|err| FlushInvalidPayload(err.to_string()))?);
        }

        let task_queue = self.task_queue.clone();
        let results: Vec<Result<(), EnqueueError>> = stream::iter(task_inputs.into_iter().map(|task_input| {
            let task_queue = task_queue.clone();
            async move {
                let kwargs = Self::into_kwargs(task_input);
                task_queue.enqueue(Task::post_process_group(kwargs))
            }
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        for result in results {
            if let Err(err) = result {
                warn!(error = %err, "failed to enqueue post-process task");
            }
        }
        Ok(())
    }
}
