use std::time::Duration;

use eventpipe_queue::Task;
use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

const SERVICEHOOKS_TTL: Duration = Duration::from_secs(60);
const HOOK_TASK_QUEUE: &str = "servicehooks";

fn servicehooks_key(project_id: i64) -> String {
    format!("servicehooks:{project_id}")
}

fn servicehooks_error_created_key(project_id: i64) -> String {
    format!("servicehooks-error-created:{project_id}")
}

/// Stage 7 (SPEC_FULL.md §4.7): enqueues one hook task per matching
/// registered hook. `event.created` is always a candidate; `event.alert`
/// is added when `job.has_alert`. A 60s-cached project-level existence
/// flag skips the registry lookup entirely for projects with no hooks;
/// a second 60s-cached flag dedupes repeat `event.created` dispatch
/// within the same window for noisy projects.
pub fn process_service_hooks<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.is_reprocessed {
            return Ok(());
        }

        let project_id = job.event.project_id;
        let has_hooks = match ctx.cache.get(&servicehooks_key(project_id)).await.and_then(|v| v.as_bool()) {
            Some(cached) => cached,
            None => {
                let present = !ctx.service_hooks.hooks_for_project(project_id).is_empty();
                ctx.cache.set(&servicehooks_key(project_id), serde_json::json!(present), SERVICEHOOKS_TTL).await;
                present
            }
        };
        if !has_hooks {
            return Ok(());
        }

        let created_already_sent = ctx
            .cache
            .get(&servicehooks_error_created_key(project_id))
            .await
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let mut events = Vec::with_capacity(2);
        if !created_already_sent {
            events.push("event.created");
        }
        if job.has_alert {
            events.push("event.alert");
        }

        for hook in ctx.service_hooks.hooks_for_project(project_id) {
            for event_name in &events {
                if hook.subscribes_to(event_name) {
                    ctx.task_queue
                        .enqueue(Task::fire_and_forget(
                            "process_service_hook",
                            HOOK_TASK_QUEUE,
                            serde_json::json!({
                                "hook_id": hook.id,
                                "event": event_name,
                                "project_id": project_id,
                                "group_id": job.group_id(),
                            }),
                        ))
                        .map_err(StageError::new)?;
                }
            }
        }

        if !created_already_sent {
            ctx.cache
                .set(&servicehooks_error_created_key(project_id), serde_json::json!(true), SERVICEHOOKS_TTL)
                .await;
        }
        Ok(())
    })
}
