use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unable to acquire lock {0:?}")]
pub struct UnableToAcquireLock(pub String);

/// A named lease the lock manager hands out (SPEC_FULL.md §4.8).
/// `acquire` is the scoped-acquisition contract: it either succeeds,
/// returning a guard that releases on `Drop`, or fails — the failure is
/// not an error to propagate (§7: "silent no-op"), it's a signal for
/// the calling stage to return early.
#[async_trait]
pub trait Lock: Send + Sync {
    async fn acquire(&self) -> Result<LockGuard, UnableToAcquireLock>;
}

/// Releases the lease on `Drop` — the scoped-acquisition contract
/// expressed as RAII instead of a context manager.
pub struct LockGuard {
    name: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.held.lock().expect("lock registry poisoned").remove(&self.name);
    }
}

#[async_trait]
pub trait LockManager: Send + Sync {
    fn get(&self, name: &str, duration: Duration) -> Box<dyn Lock>;
}

/// In-process reference `LockManager`: a set of currently-held names.
/// `duration` is accepted for interface parity with a real distributed
/// lock manager but unused here — nothing expires a lease early in a
/// single process; leases live only as long as their `LockGuard`.
pub struct InProcessLockManager {
    held: Arc<Mutex<HashSet<String>>>,
}

impl InProcessLockManager {
    pub fn new() -> Self {
        Self {
            held: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl Default for InProcessLockManager {
    fn default() -> Self {
        Self::new()
    }
}

struct NamedLock {
    name: String,
    held: Arc<Mutex<HashSet<String>>>,
}

#[async_trait]
impl Lock for NamedLock {
    async fn acquire(&self) -> Result<LockGuard, UnableToAcquireLock> {
        let mut held = self.held.lock().expect("lock registry poisoned");
        if !held.insert(self.name.clone()) {
            return Err(UnableToAcquireLock(self.name.clone()));
        }
        drop(held);
        Ok(LockGuard {
            name: self.name.clone(),
            held: Arc::clone(&self.held),
        })
    }
}

impl LockManager for InProcessLockManager {
    fn get(&self, name: &str, _duration: Duration) -> Box<dyn Lock> {
        Box::new(NamedLock {
            name: name.to_owned(),
            held: Arc::clone(&self.held),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_fails_while_first_is_held() {
        let manager = InProcessLockManager::new();
        let lock = manager.get("groupowner-bulk:1", Duration::from_secs(10));
        let guard = lock.acquire().await.unwrap();
        assert!(lock.acquire().await.is_err());
        drop(guard);
        assert!(lock.acquire().await.is_ok());
    }
}
