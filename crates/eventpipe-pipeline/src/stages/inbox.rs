use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::{InboxReason, PostProcessJob};

/// Stage 3 (SPEC_FULL.md §4.7): unlike the other stages in the 2-10
/// range, this one's own policy table treats `is_reprocessed` as a
/// first-class input rather than short-circuiting — see DESIGN.md.
pub fn process_inbox_adds<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        let reason = if job.is_reprocessed && job.group_state.is_new == Some(true) {
            Some(InboxReason::Reprocessed)
        } else if !job.is_reprocessed && !job.has_reappeared && job.group_state.is_new == Some(true) {
            Some(InboxReason::New)
        } else if !job.is_reprocessed && !job.has_reappeared && job.group_state.is_regression == Some(true) {
            Some(InboxReason::Regression)
        } else {
            // The UNIGNORED case was already emitted by stage 2.
            None
        };

        if let Some(reason) = reason {
            ctx.inbox.add(job.group_id(), reason).await?;
        }
        Ok(())
    })
}
