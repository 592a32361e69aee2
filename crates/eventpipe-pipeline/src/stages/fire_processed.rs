use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;
use crate::signal::Signal;

/// Stage 12 (SPEC_FULL.md §4.7): always runs, emitting `event_processed`
/// regardless of `is_reprocessed`.
pub fn fire_error_processed<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        ctx.signals.emit(Signal::EventProcessed {
            project_id: job.event.project_id,
            group_id: job.group_id(),
            event_id: job.event.event_id.clone(),
        });
        Ok(())
    })
}
