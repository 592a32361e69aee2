//! Post-process pipeline (SPEC_FULL.md §4.7): per-event orchestrator
//! that rebinds cached entities, runs the fixed error-category stage
//! list under locks and short-TTL caches, and contains per-stage
//! failures independently.

pub mod arena;
pub mod cache;
pub mod collaborators;
pub mod ctx;
pub mod error;
pub mod group_owner;
pub mod lock;
pub mod model;
pub mod signal;
pub mod snooze;
pub mod stages;
pub mod store;

use eventpipe_protocol::GroupState;
use eventpipe_queue::PostProcessKwargs;
use tracing::info;

pub use ctx::PipelineCtx;
pub use error::PipelineError;
pub use model::{EventBody, PostProcessJob};

/// Organization feature flag gating the performance-issues post-process
/// path (SPEC_FULL.md §4.7 step 4).
pub const PERFORMANCE_ISSUES_FEATURE: &str = "performance-issues-post-process-group";

/// Entry point the task system invokes for `post_process_group`
/// (SPEC_FULL.md §4.7). Returns `Ok(())` for every outcome that the
/// spec treats as a successful task completion, including the
/// `missing_cache` no-op — only a genuinely unresolvable rebind is
/// surfaced as an `Err`.
pub async fn run_pipeline(ctx: &PipelineCtx, kwargs: PostProcessKwargs) -> Result<(), PipelineError> {
    // Step 1: load event.
    let Some(event) = ctx.event_store.load(&kwargs.cache_key).await else {
        info!(cache_key = %kwargs.cache_key, reason = "missing_cache", "post_process.skipped");
        return Ok(());
    };

    // Step 2: delete from processing store (single-consumption on replays).
    ctx.event_store.delete(&kwargs.cache_key).await;

    // Step 3: rebind referenced entities.
    let project = ctx
        .projects
        .get(event.project_id)
        .await
        .ok_or(PipelineError::UnknownProject(event.project_id))?;
    let organization = ctx
        .organizations
        .get(project.organization_id)
        .await
        .ok_or(PipelineError::UnknownOrganization(project.organization_id))?;

    // Step 4: classify event type.
    if event.is_transaction {
        ctx.signals.emit(signal::Signal::TransactionProcessed {
            project_id: event.project_id,
            event_id: event.event_id.clone(),
        });
        if !organization.has_feature(PERFORMANCE_ISSUES_FEATURE) {
            return Ok(());
        }
    }

    // Step 5: normalize group_states.
    let group_states = match kwargs.group_states {
        Some(states) if event.is_transaction => {
            // Performance pipeline is out of scope here (SPEC_FULL.md §4.7
            // step 5 / §9 open question).
            let _ = states;
            return Ok(());
        }
        Some(states) => states,
        None => vec![GroupState {
            id: kwargs.group_id.unwrap_or_default(),
            is_new: kwargs.is_new,
            is_regression: kwargs.is_regression,
            is_new_group_environment: kwargs.is_new_group_environment,
        }],
    };

    // Step 6: run stages per group_state.
    for group_state in group_states {
        // has_reappeared starts as "not already known to be new"
        // (SPEC_FULL.md §4.7 rule 1 / original_source post_process.py:418
        // `"has_reappeared": not group_state["is_new"]`); a brand-new group
        // can't have "reappeared" yet, so the snooze stage must no-op for it.
        let has_reappeared = group_state.is_new != Some(true);
        let mut job = PostProcessJob {
            event: event.clone(),
            group_state,
            is_reprocessed: event.is_reprocessed,
            has_reappeared,
            has_alert: false,
        };
        stages::run_stages(ctx, &mut job).await;
    }

    Ok(())
}
