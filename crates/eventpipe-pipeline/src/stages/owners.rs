use std::collections::HashSet;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::ctx::PipelineCtx;
use crate::error::StageError;
use crate::model::PostProcessJob;

const OWNER_EXISTS_TTL_TRUE: Duration = Duration::from_secs(3600);
const OWNER_EXISTS_TTL_FALSE: Duration = Duration::from_secs(60);

fn owner_exists_key(group_id: i64) -> String {
    format!("owner_exists:{group_id}")
}

fn assignee_exists_key(group_id: i64) -> String {
    format!("assignee_exists:{group_id}")
}

/// Stage 4 (SPEC_FULL.md §4.7): cached existence checks gate the
/// (relatively expensive) owner computation; reconciliation runs under
/// the non-blocking `groupowner-bulk:<group_id>` lease and is a silent
/// no-op if the lease is already held (SPEC_FULL.md §7: "UnableToAcquireLock
/// ... is not an error variant at all at the call site").
pub fn handle_owner_assignment<'a>(ctx: &'a PipelineCtx, job: &'a mut PostProcessJob) -> BoxFuture<'a, Result<(), StageError>> {
    Box::pin(async move {
        if job.is_reprocessed {
            return Ok(());
        }

        let group_id = job.group_id();
        let has_owners = cached_bool(ctx, &owner_exists_key(group_id)).await;
        let has_assignees = cached_bool(ctx, &assignee_exists_key(group_id)).await;
        if has_owners || has_assignees {
            return Ok(());
        }

        let owners = ctx.owner_resolver.compute_owners(job.event.project_id, group_id).await?;
        ctx.cache
            .set(&owner_exists_key(group_id), serde_json::json!(!owners.is_empty()), ttl_for(!owners.is_empty()))
            .await;

        if owners.is_empty() {
            return Ok(());
        }

        let lock = ctx.lock_manager.get(&format!("groupowner-bulk:{group_id}"), Duration::from_secs(10));
        let Ok(_guard) = lock.acquire().await else {
            return Ok(());
        };

        let target: HashSet<_> = owners.into_iter().collect();
        let existing = ctx.owner_store.existing(group_id).await;

        let to_delete: HashSet<_> = existing.difference(&target).cloned().collect();
        let to_insert: HashSet<_> = target.difference(&existing).cloned().collect();

        if !to_delete.is_empty() {
            ctx.owner_store.delete_many(group_id, &to_delete).await;
        }
        if !to_insert.is_empty() {
            ctx.owner_store.insert_many(group_id, &to_insert).await;
        }

        Ok(())
    })
}

async fn cached_bool(ctx: &PipelineCtx, key: &str) -> bool {
    ctx.cache.get(key).await.and_then(|v| v.as_bool()).unwrap_or(false)
}

fn ttl_for(exists: bool) -> Duration {
    if exists {
        OWNER_EXISTS_TTL_TRUE
    } else {
        OWNER_EXISTS_TTL_FALSE
    }
}
