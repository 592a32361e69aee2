use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::GroupOwnerRow;

/// Persistence boundary for the `GroupOwner` rows stage 4 reconciles
/// (SPEC_FULL.md §4.7 stage 4). Kept separate from `Cache` since these
/// rows are durable records, not an idempotency flag.
#[async_trait]
pub trait GroupOwnerStore: Send + Sync {
    async fn existing(&self, group_id: i64) -> HashSet<GroupOwnerRow>;
    async fn delete_many(&self, group_id: i64, rows: &HashSet<GroupOwnerRow>);
    async fn insert_many(&self, group_id: i64, rows: &HashSet<GroupOwnerRow>);
}

/// In-process reference implementation, sufficient to exercise P8
/// (owner reconciliation idempotence) without a real database.
#[derive(Default)]
pub struct InMemoryGroupOwnerStore {
    rows: Mutex<HashMap<i64, HashSet<GroupOwnerRow>>>,
}

impl InMemoryGroupOwnerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupOwnerStore for InMemoryGroupOwnerStore {
    async fn existing(&self, group_id: i64) -> HashSet<GroupOwnerRow> {
        self.rows.lock().expect("group owner store poisoned").get(&group_id).cloned().unwrap_or_default()
    }

    async fn delete_many(&self, group_id: i64, rows: &HashSet<GroupOwnerRow>) {
        if let Some(existing) = self.rows.lock().expect("group owner store poisoned").get_mut(&group_id) {
            for row in rows {
                existing.remove(row);
            }
        }
    }

    async fn insert_many(&self, group_id: i64, rows: &HashSet<GroupOwnerRow>) {
        self.rows
            .lock()
            .expect("group owner store poisoned")
            .entry(group_id)
            .or_default()
            .extend(rows.iter().cloned());
    }
}
