//! Per-character write serialization.

use std::sync::Arc;

use dashmap::DashMap;
use sagaforge_domain::CharacterId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per character. Different characters never contend.
#[derive(Default)]
pub struct CharacterLocks {
    locks: DashMap<CharacterId, Arc<Mutex<()>>>,
}

impl CharacterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. Released when the guard drops.
    pub async fn acquire(&self, id: CharacterId) -> CharacterGuard<'_> {
        // Clone out of the map so no shard guard is held across the await.
        let lock = self.locks.entry(id).or_default().value().clone();
        CharacterGuard {
            locks: self,
            id,
            guard: Some(lock.lock_owned().await),
        }
    }

    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one character.
///
/// Dropping it releases the mutex and evicts the entry once no other task
/// holds or waits on it, so the table only tracks characters in use.
pub struct CharacterGuard<'a> {
    locks: &'a CharacterLocks,
    id: CharacterId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for CharacterGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone; removal runs under the shard lock,
        // so a new acquirer either sees this entry or creates a fresh one.
        self.locks
            .locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
