use std::time::Duration;

use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

const ORG_HAS_COMMIT_TTL: Duration = Duration::from_secs(3600);
const GROUP_COMMIT_DISPATCHED_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Feature flag selecting commit-context attribution over the older
/// suspect-commits heuristic (SPEC_FULL.md §4.7 stage 6).
pub const COMMIT_CONTEXT_FEATURE: &str = "commit-context-post-process";

fn org_has_commit_key(organization_id: i64) -> String {
    format!("org-has-commit:{organization_id}")
}

fn group_dispatched_key(group_id: i64) -> String {
    format!("group-commit-dispatched:{group_id}")
}

/// Stage 6 (SPEC_FULL.md §4.7): under the non-blocking
/// `post-process-commit:<group>` lease, gate dispatch on a 1h-cached
/// org-level "has any commit" check and a 1-week-cached per-group
/// "already dispatched" flag before enqueueing commit attribution.
pub fn process_commits<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.is_reprocessed {
            return Ok(());
        }

        let group_id = job.group_id();
        let lock = ctx.lock_manager.get(&format!("post-process-commit:{group_id}"), Duration::from_secs(10));
        let Ok(_guard) = lock.acquire().await else {
            return Ok(());
        };

        if cached_bool(ctx, &group_dispatched_key(group_id)).await {
            return Ok(());
        }

        let project = ctx
            .projects
            .get(job.event.project_id)
            .await
            .ok_or_else(|| StageError::msg(format!("unknown project {}", job.event.project_id)))?;
        let organization = ctx
            .organizations
            .get(project.organization_id)
            .await
            .ok_or_else(|| StageError::msg(format!("unknown organization {}", project.organization_id)))?;

        let has_commit = match ctx.cache.get(&org_has_commit_key(organization.id)).await.and_then(|v| v.as_bool()) {
            Some(cached) => cached,
            None => {
                let computed = ctx.commit_attributor.org_has_commit(organization.id).await?;
                ctx.cache
                    .set(&org_has_commit_key(organization.id), serde_json::json!(computed), ORG_HAS_COMMIT_TTL)
                    .await;
                computed
            }
        };

        if !has_commit {
            return Ok(());
        }

        let use_commit_context = organization.has_feature(COMMIT_CONTEXT_FEATURE);
        ctx.commit_attributor.dispatch(job, use_commit_context).await?;
        ctx.cache
            .set(&group_dispatched_key(group_id), serde_json::json!(true), GROUP_COMMIT_DISPATCHED_TTL)
            .await;
        Ok(())
    })
}

async fn cached_bool(ctx: &PipelineCtx, key: &str) -> bool {
    ctx.cache.get(key).await.and_then(|v| v.as_bool()).unwrap_or(false)
}
