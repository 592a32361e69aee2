//! End-to-end coverage of `run_pipeline`/`run_stages` against the
//! scenarios in SPEC_FULL.md §8: stage containment (P7) and the
//! reprocessed-event scenario.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eventpipe_pipeline::arena::{EntityCache, GroupCache, OrganizationCache, ProjectCache};
use eventpipe_pipeline::cache::MokaCache;
use eventpipe_pipeline::collaborators::{
    AttachmentStore, CommitAttributor, GroupTimeline, InboxStore, OwnerResolver, Plugin, PluginRegistry, RuleProcessor,
    ServiceHookRegistry, TimelineEvent,
};
use eventpipe_pipeline::ctx::PipelineCtx;
use eventpipe_pipeline::error::StageError;
use eventpipe_pipeline::group_owner::InMemoryGroupOwnerStore;
use eventpipe_pipeline::lock::InProcessLockManager;
use eventpipe_pipeline::model::{EventBody, GroupOwnerRow, InboxReason, Organization, Project, PostProcessJob};
use eventpipe_pipeline::signal::{RecordingSignalSink, Signal};
use eventpipe_pipeline::stages::{run_stages, ERROR_STAGES};
use eventpipe_pipeline::store::InMemoryEventStore;
use eventpipe_protocol::GroupState;

struct NullServiceHooks;
impl ServiceHookRegistry for NullServiceHooks {
    fn hooks_for_project(&self, _project_id: i64) -> Vec<eventpipe_pipeline::collaborators::ServiceHook> {
        Vec::new()
    }
}

struct NullPlugins;
impl PluginRegistry for NullPlugins {
    fn plugins_for_project(&self, _project_id: i64) -> Vec<Arc<dyn Plugin>> {
        Vec::new()
    }
}

struct NullCommitAttributor;
#[async_trait]
impl CommitAttributor for NullCommitAttributor {
    async fn org_has_commit(&self, _organization_id: i64) -> Result<bool, StageError> {
        Ok(false)
    }
    async fn dispatch(&self, _job: &PostProcessJob, _use_commit_context: bool) -> Result<(), StageError> {
        Ok(())
    }
}

struct NullOwnerResolver;
#[async_trait]
impl OwnerResolver for NullOwnerResolver {
    async fn compute_owners(&self, _project_id: i64, _group_id: i64) -> Result<Vec<GroupOwnerRow>, StageError> {
        Ok(Vec::new())
    }
}

struct NullSimilarity;
#[async_trait]
impl eventpipe_pipeline::collaborators::SimilarityIndex for NullSimilarity {
    async fn record(&self, _project_id: i64, _group_id: i64, _event_id: &str) -> Result<(), StageError> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingAttachmentStore {
    calls: Mutex<Vec<(i64, String, i64)>>,
}
#[async_trait]
impl AttachmentStore for RecordingAttachmentStore {
    async fn rebind(&self, project_id: i64, event_id: &str, group_id: i64) -> Result<usize, StageError> {
        self.calls.lock().unwrap().push((project_id, event_id.to_owned(), group_id));
        Ok(1)
    }
}

#[derive(Default)]
struct RecordingInbox {
    adds: Mutex<Vec<(i64, InboxReason)>>,
}
#[async_trait]
impl InboxStore for RecordingInbox {
    async fn add(&self, group_id: i64, reason: InboxReason) -> Result<(), StageError> {
        self.adds.lock().unwrap().push((group_id, reason));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingTimeline {
    events: Mutex<Vec<(i64, TimelineEvent)>>,
}
#[async_trait]
impl GroupTimeline for RecordingTimeline {
    async fn record(&self, group_id: i64, event: TimelineEvent) -> Result<(), StageError> {
        self.events.lock().unwrap().push((group_id, event));
        Ok(())
    }
}

/// Always fails, for exercising P7: stage containment.
struct FailingRuleProcessor;
#[async_trait]
impl RuleProcessor for FailingRuleProcessor {
    async fn process(&self, _job: &PostProcessJob) -> Result<bool, StageError> {
        Err(StageError::msg("rule engine exploded"))
    }
}

struct OkRuleProcessor;
#[async_trait]
impl RuleProcessor for OkRuleProcessor {
    async fn process(&self, _job: &PostProcessJob) -> Result<bool, StageError> {
        Ok(false)
    }
}

fn make_ctx(
    rule_processor: Arc<dyn RuleProcessor>,
) -> (
    PipelineCtx,
    Arc<RecordingSignalSink>,
    Arc<RecordingInbox>,
    Arc<RecordingAttachmentStore>,
    eventpipe_queue::InProcessTaskReceiver,
) {
    let signals = Arc::new(RecordingSignalSink::new());
    let inbox = Arc::new(RecordingInbox::default());
    let attachments = Arc::new(RecordingAttachmentStore::default());
    let (queue, rx) = eventpipe_queue::InProcessTaskQueue::new();

    let ctx = PipelineCtx {
        cache: Arc::new(MokaCache::default()),
        lock_manager: Arc::new(InProcessLockManager::new()),
        task_queue: Arc::new(queue),
        signals: signals.clone(),
        event_store: Arc::new(InMemoryEventStore::new()),
        projects: Arc::new(ProjectCache::new()),
        organizations: Arc::new(OrganizationCache::new()),
        groups: Arc::new(GroupCache::new()),
        rule_processor,
        owner_resolver: Arc::new(NullOwnerResolver),
        owner_store: Arc::new(InMemoryGroupOwnerStore::new()),
        commit_attributor: Arc::new(NullCommitAttributor),
        service_hooks: Arc::new(NullServiceHooks),
        plugins: Arc::new(NullPlugins),
        similarity: Arc::new(NullSimilarity),
        attachments: attachments.clone(),
        inbox: inbox.clone(),
        timeline: Arc::new(RecordingTimeline::default()),
    };
    (ctx, signals, inbox, attachments, rx)
}

fn job(is_reprocessed: bool, is_new: Option<bool>) -> PostProcessJob {
    PostProcessJob {
        event: EventBody {
            event_id: "fe0ee9a2bc3b415497bad68aaf70dc7f".into(),
            project_id: 1,
            is_transaction: false,
            is_reprocessed,
        },
        group_state: GroupState {
            id: 43,
            is_new,
            is_regression: None,
            is_new_group_environment: Some(false),
        },
        is_reprocessed,
        // Mirrors run_pipeline's job construction (SPEC_FULL.md §4.7 rule 1 /
        // original_source post_process.py:418): `not group_state["is_new"]`.
        has_reappeared: is_new != Some(true),
        has_alert: false,
    }
}

/// P7: a single failing stage does not prevent the rest of the table
/// from running once each.
#[tokio::test]
async fn stage_failure_does_not_abort_the_pipeline() {
    let (ctx, signals, _inbox, attachments, _rx) = make_ctx(Arc::new(FailingRuleProcessor));
    let mut j = job(false, Some(true));

    run_stages(&ctx, &mut j).await;

    // process_rules failed, but later stages (attachments, fire_error_processed)
    // still ran exactly once.
    assert_eq!(attachments.calls.lock().unwrap().len(), 1);
    assert!(signals
        .emitted()
        .iter()
        .any(|s| matches!(s, Signal::EventProcessed { .. })));
}

/// Every stage runs exactly once per job when nothing fails.
#[tokio::test]
async fn every_stage_runs_once_on_the_happy_path() {
    let (ctx, signals, inbox, attachments, _rx) = make_ctx(Arc::new(OkRuleProcessor));
    let mut j = job(false, Some(true));

    run_stages(&ctx, &mut j).await;

    assert_eq!(attachments.calls.lock().unwrap().len(), 1);
    assert_eq!(inbox.adds.lock().unwrap().len(), 1);
    assert_eq!(inbox.adds.lock().unwrap()[0].1, InboxReason::New);
    assert!(signals
        .emitted()
        .iter()
        .any(|s| matches!(s, Signal::EventProcessed { .. })));
}

/// Scenario 6: reprocessed events skip stages 2-10 but still rebind
/// attachments, add to inbox with REPROCESSED, and fire event_processed.
#[tokio::test]
async fn reprocessed_event_only_rebinds_attachments_and_inbox() {
    let (ctx, signals, inbox, attachments, _rx) = make_ctx(Arc::new(OkRuleProcessor));
    let mut j = job(true, Some(true));

    run_stages(&ctx, &mut j).await;

    assert_eq!(attachments.calls.lock().unwrap().len(), 1);
    assert_eq!(inbox.adds.lock().unwrap(), vec![(43, InboxReason::Reprocessed)]);
    assert!(signals
        .emitted()
        .iter()
        .any(|s| matches!(s, Signal::EventProcessed { .. })));
}

#[test]
fn stage_table_has_the_spec_mandated_order_length() {
    assert_eq!(ERROR_STAGES.len(), 12);
}

/// Rebind step: a project/organization pair is resolvable by id through
/// the arena caches independent of any owning reference between them.
#[tokio::test]
async fn entities_rebind_by_id_through_the_arena() {
    let (ctx, ..) = make_ctx(Arc::new(OkRuleProcessor));
    ctx.organizations.put(Organization {
        id: 7,
        slug: "acme".into(),
        feature_flags: HashSet::new(),
    });
    ctx.projects.put(Project {
        id: 1,
        organization_id: 7,
        slug: "web".into(),
    });

    let project = ctx.projects.get(1).await.unwrap();
    let organization = ctx.organizations.get(project.organization_id).await.unwrap();
    assert_eq!(organization.id, 7);
}
