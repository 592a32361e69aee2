use futures::future::BoxFuture;
use tracing::info;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

/// Stage 1: emit the "unique event" metric when this is the first time
/// the group has been seen (SPEC_FULL.md §4.7).
pub fn capture_group_stats<'a>(_ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.group_state.is_new == Some(true) {
            info!(group_id = job.group_id(), "unique event");
        }
        Ok(())
    })
}
