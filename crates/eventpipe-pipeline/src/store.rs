use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::EventBody;

/// The event processing store the pipeline entry point reads from and
/// deletes from (SPEC_FULL.md §4.7 steps 1-2): keyed by `cache_key`,
/// holding the full event body. Deleting on load enforces
/// single-consumption on replays.
#[async_trait]
pub trait EventProcessingStore: Send + Sync {
    async fn load(&self, cache_key: &str) -> Option<EventBody>;
    async fn delete(&self, cache_key: &str);
}

/// In-process reference implementation backed by a `Mutex<HashMap>`.
/// Production wiring of a real event processing store is external per
/// SPEC_FULL.md §1.
#[derive(Default)]
pub struct InMemoryEventStore {
    entries: Mutex<HashMap<String, EventBody>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, cache_key: impl Into<String>, body: EventBody) {
        self.entries.lock().expect("event store poisoned").insert(cache_key.into(), body);
    }
}

#[async_trait]
impl EventProcessingStore for InMemoryEventStore {
    async fn load(&self, cache_key: &str) -> Option<EventBody> {
        self.entries.lock().expect("event store poisoned").get(cache_key).cloned()
    }

    async fn delete(&self, cache_key: &str) {
        self.entries.lock().expect("event store poisoned").remove(cache_key);
    }
}
