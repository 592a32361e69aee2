use futures::future::BoxFuture;
use tracing::warn;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

/// Stage 9 (SPEC_FULL.md §4.7): runs every installed project plugin's
/// post-process call contract. One plugin's failure is logged and does
/// not stop the rest of the loop — the same containment the outer
/// stage table applies one level up.
pub fn process_plugins<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.is_reprocessed {
            return Ok(());
        }

        for plugin in ctx.plugins.plugins_for_project(job.event.project_id) {
            if let Err(err) = plugin.post_process(job).await {
                warn!(plugin = plugin.name(), error = %err, group_id = job.group_id(), "plugin post-process failed");
            }
        }
        Ok(())
    })
}
