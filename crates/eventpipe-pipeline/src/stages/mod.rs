mod attachments;
mod commits;
mod fire_processed;
mod hooks;
mod inbox;
mod owners;
mod plugins;
mod resource_change;
mod rules;
mod similarity;
mod snooze_stage;
mod stats;

use futures::future::BoxFuture;
use tracing::warn;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

/// A single pipeline stage (SPEC_FULL.md §4.7.1): Rust's expression of
/// §9's "table of function values keyed by category" — a higher-order
/// fn pointer rather than a plain sync fn, since every stage's
/// collaborators (cache, lock manager, task queue) are async.
pub type StageFn = for<'a> fn(&'a PipelineCtx, &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>>;

/// The fixed, mandatory stage order (SPEC_FULL.md §4.7). Every stage
/// runs for every job; stages 2 and 4-10 each check `job.is_reprocessed`
/// as their own first step and no-op when it's set (SPEC_FULL.md §4.7:
/// "every stage first checks is_reprocessed; if true, stages 2-10
/// short-circuit"). Stage 3 (inbox adds) is the documented exception:
/// its own policy table handles `is_reprocessed` as a first-class input
/// (producing reason REPROCESSED) rather than no-op'ing, and stages 1,
/// 11, 12 always run — see DESIGN.md for why a single always-run table
/// with per-stage guards, rather than two parallel stage lists, is the
/// reading that satisfies both the short-circuit sentence and the
/// "reprocessed event" scenario.
pub const ERROR_STAGES: &[StageFn] = &[
    stats::capture_group_stats,
    snooze_stage::process_snoozes,
    inbox::process_inbox_adds,
    owners::handle_owner_assignment,
    rules::process_rules,
    commits::process_commits,
    hooks::process_service_hooks,
    resource_change::process_resource_change_bounds,
    plugins::process_plugins,
    similarity::process_similarity,
    attachments::update_existing_attachments,
    fire_processed::fire_error_processed,
];

/// Runs the stage table in order. Each stage's failure is caught and
/// logged locally (SPEC_FULL.md §4.7/§7: a stage exception does not
/// abort the pipeline; subsequent stages still run) — the literal
/// containment loop behind P7.
pub async fn run_stages(ctx: &PipelineCtx, job: &mut PostProcessJob) {
    for stage in ERROR_STAGES {
        if let Err(err) = stage(ctx, job).await {
            warn!(error = %err, group_id = job.group_id(), "post-process stage failed, continuing");
        }
    }
}
