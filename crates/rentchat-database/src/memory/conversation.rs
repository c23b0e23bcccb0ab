//! In-memory conversation store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{ConversationId, ConversationKey, UserId};
use rentchat_entity::{Conversation, Message};

use crate::store::ConversationStore;

#[derive(Debug, Default)]
struct Tables {
    by_id: HashMap<ConversationId, Conversation>,
    by_key: HashMap<ConversationKey, ConversationId>,
}

impl Tables {
    fn find_or_create(
        &mut self,
        key: &ConversationKey,
        receiver: UserId,
        now: DateTime<Utc>,
    ) -> &mut Conversation {
        let id = *self.by_key.entry(*key).or_insert_with(ConversationId::new);
        self.by_id.entry(id).or_insert_with(|| Conversation {
            id,
            ..Conversation::new(*key, receiver, now)
        })
    }
}

/// Conversation store backed by two maps under one lock.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations.
    pub async fn len(&self) -> usize {
        self.tables.read().await.by_id.len()
    }

    /// Whether no conversation has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Make every write fail with a database error, as a lost connection would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("Conversation store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn find_by_id(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        Ok(self.tables.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_key(&self, key: &ConversationKey) -> AppResult<Option<Conversation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_key
            .get(key)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn record_message(
        &self,
        key: &ConversationKey,
        message: &Message,
    ) -> AppResult<Conversation> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let conversation = tables.find_or_create(key, message.receiver_id, message.created_at);
        conversation.record(message, Utc::now());
        Ok(conversation.clone())
    }

    async fn mark_read(&self, id: ConversationId, user_id: UserId) -> AppResult<Conversation> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let conversation = tables
            .by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Conversation not found"))?;
        conversation.unread_count.reset(user_id);
        conversation.updated_at = Utc::now();
        Ok(conversation.clone())
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Conversation>> {
        let tables = self.tables.read().await;
        let mut list: Vec<Conversation> = tables
            .by_id
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(list)
    }

    async fn total_unread(&self, user_id: UserId) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_id
            .values()
            .filter(|c| c.has_participant(user_id))
            .map(|c| u64::from(c.unread_for(user_id)))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentchat_core::types::{MessageId, VehicleId};

    fn message_to(receiver: UserId, sender: UserId, vehicle: VehicleId) -> Message {
        Message {
            id: MessageId::new_ordered(),
            sender_id: sender,
            receiver_id: receiver,
            vehicle_id: vehicle,
            content: "hi".to_string(),
            message_type: "text".to_string(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_message_is_order_independent() {
        let store = MemoryConversationStore::new();
        let (a, b, v) = (UserId::new(), UserId::new(), VehicleId::new());
        let first = store
            .record_message(&ConversationKey::new(a, b, v).expect("key"), &message_to(b, a, v))
            .await
            .expect("create");
        let second = store
            .record_message(&ConversationKey::new(b, a, v).expect("key"), &message_to(a, b, v))
            .await
            .expect("update");
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
        assert_eq!(first.unread_for(b), 1);
        assert!(!first.unread_count.contains(a));
        assert_eq!(second.unread_for(a), 1);
    }

    #[tokio::test]
    async fn test_record_message_increments_receiver() {
        let store = MemoryConversationStore::new();
        let (a, b, v) = (UserId::new(), UserId::new(), VehicleId::new());
        let key = ConversationKey::new(a, b, v).expect("key");

        let first = store.record_message(&key, &message_to(b, a, v)).await.expect("record");
        let msg = message_to(b, a, v);
        let updated = store.record_message(&key, &msg).await.expect("record");

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.unread_for(b), 2);
        assert_eq!(updated.unread_for(a), 0);
        assert_eq!(updated.last_message_id, Some(msg.id));
        assert_eq!(store.total_unread(b).await.expect("sum"), 2);

        let read = store.mark_read(updated.id, b).await.expect("reset");
        assert_eq!(read.unread_for(b), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_creates_nothing() {
        let store = MemoryConversationStore::new();
        let (a, b, v) = (UserId::new(), UserId::new(), VehicleId::new());
        store.set_unavailable(true);
        let err = store
            .record_message(&ConversationKey::new(a, b, v).expect("key"), &message_to(b, a, v))
            .await
            .expect_err("unavailable");
        assert_eq!(err.kind, rentchat_core::ErrorKind::Database);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let store = MemoryConversationStore::new();
        let me = UserId::new();
        let (older_peer, newer_peer) = (UserId::new(), UserId::new());
        let (v1, v2) = (VehicleId::new(), VehicleId::new());

        let mut early = message_to(me, older_peer, v1);
        early.created_at = Utc::now() - chrono::Duration::minutes(5);
        let older = store
            .record_message(&ConversationKey::new(me, older_peer, v1).expect("key"), &early)
            .await
            .expect("create");
        let newer = store
            .record_message(
                &ConversationKey::new(me, newer_peer, v2).expect("key"),
                &message_to(me, newer_peer, v2),
            )
            .await
            .expect("create");
        let (x, y, v3) = (UserId::new(), UserId::new(), VehicleId::new());
        store
            .record_message(&ConversationKey::new(x, y, v3).expect("key"), &message_to(y, x, v3))
            .await
            .expect("unrelated");

        let ids: Vec<_> = store
            .list_for_user(me)
            .await
            .expect("list")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
