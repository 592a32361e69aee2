//! Post-process task queue boundary (SPEC_FULL.md §4.6). This crate only
//! specifies the enqueue contract: a task name, a logical queue, a pair
//! of time limits, and JSON kwargs. Everything downstream of enqueue
//! (the actual broker, worker pool, retry policy) is external per §1;
//! `InProcessTaskQueue` is a reference implementation sufficient to drive
//! the pipeline end-to-end in tests and small deployments.

use std::time::Duration;

use eventpipe_protocol::GroupState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical task name for the post-process pipeline entry point.
pub const POST_PROCESS_GROUP: &str = "post_process_group";
/// Logical queue the post-process task is routed to.
pub const POST_PROCESS_ERRORS_QUEUE: &str = "post_process_errors";
pub const POST_PROCESS_HARD_TIME_LIMIT: Duration = Duration::from_secs(120);
pub const POST_PROCESS_SOFT_TIME_LIMIT: Duration = Duration::from_secs(110);

/// Enqueue kwargs for `post_process_group`, exactly per SPEC_FULL.md §4.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessKwargs {
    pub event_id: String,
    pub project_id: i64,
    pub group_id: Option<i64>,
    pub primary_hash: Option<String>,
    pub is_new: Option<bool>,
    pub is_regression: Option<bool>,
    pub is_new_group_environment: Option<bool>,
    #[serde(default)]
    pub group_states: Option<Vec<GroupState>>,
    pub cache_key: String,
}

/// One unit of work as handed to the task system. Generic enough to
/// cover both `post_process_group` itself and the tasks the pipeline's
/// later stages enqueue in turn (service hooks, plugin post-process,
/// resource-change-bound events, commit dispatch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub queue: String,
    pub hard_time_limit: Duration,
    pub soft_time_limit: Duration,
    pub kwargs: serde_json::Value,
}

impl Task {
    pub fn post_process_group(kwargs: PostProcessKwargs) -> Self {
        Task {
            name: POST_PROCESS_GROUP.to_owned(),
            queue: POST_PROCESS_ERRORS_QUEUE.to_owned(),
            hard_time_limit: POST_PROCESS_HARD_TIME_LIMIT,
            soft_time_limit: POST_PROCESS_SOFT_TIME_LIMIT,
            kwargs: serde_json::to_value(kwargs).expect("kwargs always serializable"),
        }
    }

    /// A named, queue-routed task with no declared time limit — used by
    /// pipeline stages that fan out work to other parts of the system
    /// (service hooks, plugins, resource-change-bound events) where the
    /// time-limit contract of SPEC_FULL.md §4.6 doesn't apply.
    pub fn fire_and_forget(
        name: impl Into<String>,
        queue: impl Into<String>,
        kwargs: serde_json::Value,
    ) -> Self {
        Task {
            name: name.into(),
            queue: queue.into(),
            hard_time_limit: Duration::ZERO,
            soft_time_limit: Duration::ZERO,
            kwargs,
        }
    }
}

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("task queue is closed")]
    Closed,
}

/// The enqueue contract every forwarder variant and every pipeline stage
/// that fans out work depends on. Kept minimal and synchronous at the
/// call site (matching "enqueue" being a suspension point per §5, not a
/// blocking one) by being backed by an unbounded channel in the
/// reference implementation.
pub trait TaskQueue: Send + Sync {
    fn enqueue(&self, task: Task) -> Result<(), EnqueueError>;
}

/// In-process reference implementation: an unbounded mpsc channel. A
/// worker pool drains `InProcessTaskReceiver` and invokes the pipeline
/// directly. Sufficient for tests and single-node deployments; a real
/// broker-backed `TaskQueue` is external per SPEC_FULL.md §1.
#[derive(Clone)]
pub struct InProcessTaskQueue {
    sender: tokio::sync::mpsc::UnboundedSender<Task>,
}

pub struct InProcessTaskReceiver {
    receiver: tokio::sync::mpsc::UnboundedReceiver<Task>,
}

impl InProcessTaskQueue {
    pub fn new() -> (Self, InProcessTaskReceiver) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, InProcessTaskReceiver { receiver })
    }
}

impl TaskQueue for InProcessTaskQueue {
    fn enqueue(&self, task: Task) -> Result<(), EnqueueError> {
        self.sender.send(task).map_err(|_| EnqueueError::Closed)
    }
}

impl InProcessTaskReceiver {
    pub async fn recv(&mut self) -> Option<Task> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueued_task_is_received_in_order() {
        let (queue, mut rx) = InProcessTaskQueue::new();
        let kwargs = PostProcessKwargs {
            event_id: "e1".into(),
            project_id: 1,
            group_id: Some(2),
            primary_hash: None,
            is_new: Some(true),
            is_regression: None,
            is_new_group_environment: None,
            group_states: None,
            cache_key: "e:abc".into(),
        };
        queue.enqueue(Task::post_process_group(kwargs.clone())).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.name, POST_PROCESS_GROUP);
        assert_eq!(received.queue, POST_PROCESS_ERRORS_QUEUE);
        let round_tripped: PostProcessKwargs = serde_json::from_value(received.kwargs).unwrap();
        assert_eq!(round_tripped, kwargs);
    }

    #[test]
    fn enqueue_after_receiver_dropped_errors() {
        let (queue, rx) = InProcessTaskQueue::new();
        drop(rx);
        let kwargs = PostProcessKwargs {
            event_id: "e1".into(),
            project_id: 1,
            group_id: None,
            primary_hash: None,
            is_new: None,
            is_regression: None,
            is_new_group_environment: None,
            group_states: None,
            cache_key: "e:abc".into(),
        };
        assert!(matches!(
            queue.enqueue(Task::post_process_group(kwargs)),
            Err(EnqueueError::Closed)
        ));
    }
}
