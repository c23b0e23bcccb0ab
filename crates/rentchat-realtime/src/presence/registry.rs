//! Presence registry: which users hold a live session on this process.
//!
//! One active session per user. A reconnect overwrites the previous entry
//! (last writer wins). Entries are never persisted; a multi-node deployment
//! would need an external pub/sub layer to share them.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use rentchat_core::types::{SessionId, UserId};
use rentchat_entity::UserSummary;

/// The live session of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    /// Transport session currently bound to the user.
    pub session_id: SessionId,
    /// Minimal user summary.
    pub user: UserSummary,
    /// When this session registered.
    pub since: DateTime<Utc>,
}

/// User id → live session.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: DashMap<UserId, PresenceEntry>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `session_id` to `user_id`, replacing any earlier session.
    ///
    /// Returns the replaced entry.
    pub fn register(
        &self,
        user_id: UserId,
        session_id: SessionId,
        user: UserSummary,
    ) -> Option<PresenceEntry> {
        self.entries.insert(
            user_id,
            PresenceEntry {
                session_id,
                user,
                since: Utc::now(),
            },
        )
    }

    /// Remove the entry of `user_id`. No-op when absent.
    pub fn unregister(&self, user_id: UserId) -> Option<PresenceEntry> {
        self.entries.remove(&user_id).map(|(_, entry)| entry)
    }

    /// Remove the entry of `user_id` only if it still points at
    /// `session_id`. Returns whether it was removed.
    pub fn unregister_session(&self, user_id: UserId, session_id: SessionId) -> bool {
        self.entries
            .remove_if(&user_id, |_, entry| entry.session_id == session_id)
            .is_some()
    }

    /// The session currently bound to `user_id`.
    pub fn lookup(&self, user_id: UserId) -> Option<SessionId> {
        self.entries.get(&user_id).map(|entry| entry.session_id)
    }

    /// Whether `user_id` has a live session.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.entries.contains_key(&user_id)
    }

    /// Number of online users.
    pub fn online_count(&self) -> usize {
        self.entries.len()
    }
}
