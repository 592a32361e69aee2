use futures::future::BoxFuture;

use crate::collaborators::TimelineEvent;
use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::{GroupStatus, InboxReason, PostProcessJob};
use crate::signal::Signal;
use crate::snooze::{evaluate, Snooze, SnoozeOutcome};

fn cache_key(group_id: i64) -> String {
    format!("snooze:{group_id}")
}

/// Stage 2 (SPEC_FULL.md §4.7 rule 1: `is_reprocessed ∨ ¬has_reappeared
/// → no-op, return`). `job.has_reappeared` enters this stage already
/// seeded from `!group_state.is_new` at job construction
/// (original_source post_process.py:418), so a brand-new group
/// (`has_reappeared = false`) no-ops here even with a cached, exceeded
/// snooze — it cannot "reappear" before it has ever appeared.
pub fn process_snoozes<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        let group_id = job.group_id();
        let cached = ctx.cache.get(&cache_key(group_id)).await;
        let snooze: Option<Snooze> = cached.and_then(|v| serde_json::from_value(v).ok());

        let group = ctx.groups.get_group_with_redirect(group_id).await;
        let times_seen = group.as_ref().map_or(0, |g| g.effective_times_seen());
        let now = chrono::Utc::now();

        match evaluate(job.is_reprocessed, job.has_reappeared, snooze.as_ref(), times_seen, now) {
            SnoozeOutcome::NoOp => {
                job.has_reappeared = false;
            }
            SnoozeOutcome::Unignored => {
                ctx.cache.delete(&cache_key(group_id)).await;
                ctx.groups.set_status(group_id, GroupStatus::Unresolved).await;
                ctx.inbox.add(group_id, InboxReason::Unignored).await?;
                ctx.timeline.record(group_id, TimelineEvent::Unignored).await?;
                ctx.timeline.record(group_id, TimelineEvent::SetUnresolved).await?;
                ctx.signals.emit(Signal::IssueUnignored {
                    group_id,
                    transition_type: "automatic",
                });
                job.has_reappeared = true;
            }
        }
        Ok(())
    })
}
