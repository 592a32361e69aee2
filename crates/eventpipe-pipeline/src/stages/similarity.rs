use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

/// Stage 10 (SPEC_FULL.md §4.7): records the event into the similarity
/// index. The indexing algorithm itself is out of scope (§1).
pub fn process_similarity<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.is_reprocessed {
            return Ok(());
        }
        ctx.similarity
            .record(job.event.project_id, job.group_id(), &job.event.event_id)
            .await
    })
}
