use async_trait::async_trait;

use crate::error::StageError;
use crate::model::{GroupOwnerRow, InboxReason, PostProcessJob};

/// The group inbox (SPEC_FULL.md §4.7 stage 3 / stage 2's UNIGNORED
/// emission): a durable record of why a group surfaced for triage.
#[async_trait]
pub trait InboxStore: Send + Sync {
    async fn add(&self, group_id: i64, reason: InboxReason) -> Result<(), StageError>;
}

/// What an activity/history timeline entry records (SPEC_FULL.md §4.7
/// stage 2: "record history UNIGNORED, create an Activity(SET_UNRESOLVED)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    Unignored,
    SetUnresolved,
}

#[async_trait]
pub trait GroupTimeline: Send + Sync {
    async fn record(&self, group_id: i64, event: TimelineEvent) -> Result<(), StageError>;
}

/// Runs the alert rule processor for a job and reports whether any rule
/// matched (SPEC_FULL.md §4.7 stage 5, `job.has_alert`). The rule
/// engine's own decision logic is out of scope per §1; this trait is
/// the orchestration boundary.
#[async_trait]
pub trait RuleProcessor: Send + Sync {
    async fn process(&self, job: &PostProcessJob) -> Result<bool, StageError>;
}

/// Computes owners for a group (SPEC_FULL.md §4.7 stage 4) — ownership
/// rule matching and CODEOWNERS parsing are out of scope per §1; this
/// returns whatever the computed target owner set is.
#[async_trait]
pub trait OwnerResolver: Send + Sync {
    async fn compute_owners(&self, project_id: i64, group_id: i64) -> Result<Vec<GroupOwnerRow>, StageError>;
}

/// Dispatches commit-context or suspect-commit attribution for a job
/// (SPEC_FULL.md §4.7 stage 6). `use_commit_context` mirrors the
/// feature-flag branch in the stage description. `org_has_commit` backs
/// the org-level "has any commit" existence check the stage caches for
/// 1 hour before deciding whether dispatch is worth attempting at all.
#[async_trait]
pub trait CommitAttributor: Send + Sync {
    async fn org_has_commit(&self, organization_id: i64) -> Result<bool, StageError>;
    async fn dispatch(&self, job: &PostProcessJob, use_commit_context: bool) -> Result<(), StageError>;
}

/// One installed project plugin (SPEC_FULL.md §4.7 stage 9). Plugin
/// bodies are out of scope per §1; `post_process` is the call contract.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    async fn post_process(&self, job: &PostProcessJob) -> Result<(), StageError>;
}

/// A registered service hook and the event names it subscribes to
/// (SPEC_FULL.md §4.7 stage 7).
#[derive(Debug, Clone)]
pub struct ServiceHook {
    pub id: String,
    pub allowed_events: Vec<String>,
}

impl ServiceHook {
    pub fn subscribes_to(&self, event: &str) -> bool {
        self.allowed_events.iter().any(|e| e == event)
    }
}

pub trait ServiceHookRegistry: Send + Sync {
    fn hooks_for_project(&self, project_id: i64) -> Vec<ServiceHook>;
}

pub trait PluginRegistry: Send + Sync {
    fn plugins_for_project(&self, project_id: i64) -> Vec<std::sync::Arc<dyn Plugin>>;
}

/// Records a processed event into the similarity index (SPEC_FULL.md
/// §4.7 stage 10). The indexing algorithm itself is out of scope per
/// §1.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    async fn record(&self, project_id: i64, group_id: i64, event_id: &str) -> Result<(), StageError>;
}

/// Rebinds attachments previously ingested standalone for an event onto
/// its resolved group (SPEC_FULL.md §4.7 stage 11). Returns the number
/// of attachments rebound, for logging.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn rebind(&self, project_id: i64, event_id: &str, group_id: i64) -> Result<usize, StageError>;
}
