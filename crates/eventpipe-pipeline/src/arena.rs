use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::model::{Group, GroupStatus, Organization, Project};

/// Read-through cache over an entity keyed by id (SPEC_FULL.md §3.1):
/// the concrete shape of the "arena + indices" rebind strategy. No
/// entity returned by one cache ever holds an owning reference to
/// another; callers re-resolve by id through the appropriate cache.
#[async_trait]
pub trait EntityCache<T: Clone>: Send + Sync {
    async fn get(&self, id: i64) -> Option<T>;
}

pub struct ProjectCache {
    projects: Mutex<HashMap<i64, Arc<Project>>>,
}

impl ProjectCache {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
        }
    }

    pub fn put(&self, project: Project) {
        self.projects.lock().expect("project cache poisoned").insert(project.id, Arc::new(project));
    }
}

impl Default for ProjectCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityCache<Arc<Project>> for ProjectCache {
    async fn get(&self, id: i64) -> Option<Arc<Project>> {
        self.projects.lock().expect("project cache poisoned").get(&id).cloned()
    }
}

pub struct OrganizationCache {
    organizations: Mutex<HashMap<i64, Arc<Organization>>>,
}

impl OrganizationCache {
    pub fn new() -> Self {
        Self {
            organizations: Mutex::new(HashMap::new()),
        }
    }

    pub fn put(&self, organization: Organization) {
        self.organizations
            .lock()
            .expect("organization cache poisoned")
            .insert(organization.id, Arc::new(organization));
    }
}

impl Default for OrganizationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityCache<Arc<Organization>> for OrganizationCache {
    async fn get(&self, id: i64) -> Option<Arc<Organization>> {
        self.organizations.lock().expect("organization cache poisoned").get(&id).cloned()
    }
}

/// Resolves a group id to its current `Group`, transparently following
/// merge redirects (SPEC_FULL.md §3.1 `get_group_with_redirect`).
/// Redirection-table storage is out of scope per §1; this is the
/// injected trait boundary plus a reference implementation with no
/// redirects configured.
#[async_trait]
pub trait GroupResolver: Send + Sync {
    async fn get_group_with_redirect(&self, id: i64) -> Option<Arc<Group>>;

    /// Updates a group's status in place (SPEC_FULL.md §4.7 stage 2's
    /// UNIGNORED transition sets the group back to UNRESOLVED).
    async fn set_status(&self, id: i64, status: GroupStatus);
}

pub struct GroupCache {
    groups: Mutex<HashMap<i64, Arc<Group>>>,
    redirects: Mutex<HashMap<i64, i64>>,
}

impl GroupCache {
    pub fn new() -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            redirects: Mutex::new(HashMap::new()),
        }
    }

    pub fn put(&self, group: Group) {
        self.groups.lock().expect("group cache poisoned").insert(group.id, Arc::new(group));
    }

    /// Registers that `from` has been merged into `to`: lookups of
    /// `from` transparently retarget to `to`'s current state.
    pub fn redirect(&self, from: i64, to: i64) {
        self.redirects.lock().expect("group redirect table poisoned").insert(from, to);
    }
}

impl Default for GroupCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupResolver for GroupCache {
    async fn get_group_with_redirect(&self, id: i64) -> Option<Arc<Group>> {
        let target = *self.redirects.lock().expect("group redirect table poisoned").get(&id).unwrap_or(&id);
        self.groups.lock().expect("group cache poisoned").get(&target).cloned()
    }

    async fn set_status(&self, id: i64, status: GroupStatus) {
        let target = *self.redirects.lock().expect("group redirect table poisoned").get(&id).unwrap_or(&id);
        if let Some(group) = self.groups.lock().expect("group cache poisoned").get_mut(&target) {
            *group = Arc::new(Group {
                status,
                ..(**group).clone()
            });
        }
    }
}
