use futures::future::BoxFuture;
use tracing::debug;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

/// Stage 11 (SPEC_FULL.md §4.7): always runs, even for reprocessed
/// events and even when stages 2-10 short-circuited — rebinding
/// standalone-ingested attachments onto the resolved group is exactly
/// the work a reprocessed event still needs done.
pub fn update_existing_attachments<'a>(
    ctx: &'a PipelineCtx,
    job: &'a mut PostProcessJob,
) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        let rebound = ctx
            .attachments
            .rebind(job.event.project_id, &job.event.event_id, job.group_id())
            .await?;
        if rebound > 0 {
            debug!(rebound, group_id = job.group_id(), "rebound standalone attachments");
        }
        Ok(())
    })
}
