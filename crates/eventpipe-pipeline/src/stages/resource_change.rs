use eventpipe_queue::Task;
use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

const RESOURCE_CHANGE_QUEUE: &str = "resource_change_bound";
const RESOURCE_CHANGE_TASK: &str = "process_resource_change_bound";

/// Stage 8 (SPEC_FULL.md §4.7): enqueues `created` resource-change-bound
/// events. `Error` fires for every job; `Group` fires only `is_new`.
pub fn process_resource_change_bounds<'a>(
    ctx: &'a PipelineCtx,
    job: &'a mut PostProcessJob,
) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.is_reprocessed {
            return Ok(());
        }

        ctx.task_queue
            .enqueue(Task::fire_and_forget(
                RESOURCE_CHANGE_TASK,
                RESOURCE_CHANGE_QUEUE,
                serde_json::json!({
                    "resource": "Error",
                    "action": "created",
                    "project_id": job.event.project_id,
                    "event_id": job.event.event_id,
                }),
            ))
            .map_err(StageError::new)?;

        if job.group_state.is_new == Some(true) {
            ctx.task_queue
                .enqueue(Task::fire_and_forget(
                    RESOURCE_CHANGE_TASK,
                    RESOURCE_CHANGE_QUEUE,
                    serde_json::json!({
                        "resource": "Group",
                        "action": "created",
                        "group_id": job.group_id(),
                    }),
                ))
                .map_err(StageError::new)?;
        }
        Ok(())
    })
}
