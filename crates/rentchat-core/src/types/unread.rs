//! Per-participant unread message counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

/// Mapping from user id to the number of unread messages addressed to that
/// user within one conversation.
///
/// Absent keys read as zero. Counts never go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnreadCounts(BTreeMap<UserId, u32>);

impl UnreadCounts {
    /// Creates an empty counter map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Counter map for a freshly created conversation: the receiver starts
    /// with an explicit zero, the creator has no entry.
    pub fn for_new_conversation(receiver: UserId) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(receiver, 0);
        Self(counts)
    }

    /// Unread count for `user_id` (zero if absent).
    pub fn get(&self, user_id: UserId) -> u32 {
        self.0.get(&user_id).copied().unwrap_or(0)
    }

    /// Whether the map holds an explicit entry for `user_id`.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.0.contains_key(&user_id)
    }

    /// Adds one unread message for `user_id` and returns the new count.
    pub fn increment(&mut self, user_id: UserId) -> u32 {
        let count = self.0.entry(user_id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Resets the count for `user_id` to zero.
    pub fn reset(&mut self, user_id: UserId) {
        self.0.insert(user_id, 0);
    }

    /// Iterates over explicit entries.
    pub fn iter(&self) -> impl Iterator<Item = (UserId, u32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}
