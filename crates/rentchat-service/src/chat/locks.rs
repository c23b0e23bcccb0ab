//! Per-conversation single-writer locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use rentchat_core::types::ConversationKey;

/// Serializes mutations of one conversation.
///
/// Writers for different keys never contend. An entry is dropped from the
/// map once the last holder or waiter for its key is gone.
#[derive(Debug, Default)]
pub struct ConversationLocks {
    locks: DashMap<ConversationKey, Arc<Mutex<()>>>,
}

/// Exclusive access to one conversation until dropped.
#[derive(Debug)]
pub struct ConversationGuard<'a> {
    locks: &'a DashMap<ConversationKey, Arc<Mutex<()>>>,
    key: ConversationKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ConversationLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn acquire(&self, key: ConversationKey) -> ConversationGuard<'_> {
        let mutex = self.locks.entry(key).or_default().clone();
        let guard = mutex.lock_owned().await;
        ConversationGuard {
            locks: &self.locks,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for ConversationGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
