use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

/// Stage 5 (SPEC_FULL.md §4.7): runs the alert rule processor and
/// records whether any rule matched on the job, for stage 7's
/// `event.alert` gating.
pub fn process_rules<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.is_reprocessed {
            return Ok(());
        }
        job.has_alert = ctx.rule_processor.process(job).await?;
        Ok(())
    })
}
