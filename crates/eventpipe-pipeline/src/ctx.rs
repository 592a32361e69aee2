use std::sync::Arc;

use eventpipe_queue::TaskQueue;

use crate::arena::{GroupResolver, OrganizationCache, ProjectCache};
use crate::cache::Cache;
use crate::collaborators::{
    AttachmentStore, CommitAttributor, GroupTimeline, InboxStore, OwnerResolver, PluginRegistry, RuleProcessor,
    ServiceHookRegistry, SimilarityIndex,
};
use crate::group_owner::GroupOwnerStore;
use crate::lock::LockManager;
use crate::signal::SignalSink;
use crate::store::EventProcessingStore;

/// Bundles every injected collaborator the pipeline needs (SPEC_FULL.md
/// §4.7.1, §9's "explicit context struct" for the source's global
/// singletons). Passed by reference into every stage; holds no
/// process-wide mutable state of its own beyond what these
/// collaborators encapsulate.
pub struct PipelineCtx {
    pub cache: Arc<dyn Cache>,
    pub lock_manager: Arc<dyn LockManager>,
    pub task_queue: Arc<dyn TaskQueue>,
    pub signals: Arc<dyn SignalSink>,
    pub event_store: Arc<dyn EventProcessingStore>,

    pub projects: Arc<ProjectCache>,
    pub organizations: Arc<OrganizationCache>,
    pub groups: Arc<dyn GroupResolver>,

    pub rule_processor: Arc<dyn RuleProcessor>,
    pub owner_resolver: Arc<dyn OwnerResolver>,
    pub owner_store: Arc<dyn GroupOwnerStore>,
    pub commit_attributor: Arc<dyn CommitAttributor>,
    pub service_hooks: Arc<dyn ServiceHookRegistry>,
    pub plugins: Arc<dyn PluginRegistry>,
    pub similarity: Arc<dyn SimilarityIndex>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub inbox: Arc<dyn InboxStore>,
    pub timeline: Arc<dyn GroupTimeline>,
}
