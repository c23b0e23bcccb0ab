//! In-memory message store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{ConversationKey, MessageId, UserId, VehicleId};
use rentchat_entity::Message;

use crate::store::MessageStore;

/// Message store backed by an append-only vector.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    messages: RwLock<Vec<Message>>,
    unavailable: AtomicBool,
}

impl MemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with a database error, as a lost connection would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored messages.
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Whether nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("Message store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn insert(&self, message: &Message) -> AppResult<()> {
        self.check_available()?;
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn delete(&self, id: MessageId) -> AppResult<()> {
        self.check_available()?;
        self.messages.write().await.retain(|m| m.id != id);
        Ok(())
    }

    async fn list_for_scope(&self, key: &ConversationKey) -> AppResult<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut scoped: Vec<Message> = messages
            .iter()
            .filter(|m| {
                m.vehicle_id == key.vehicle_id
                    && key.participants.contains(m.sender_id)
                    && key.participants.contains(m.receiver_id)
            })
            .cloned()
            .collect();
        scoped.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(scoped)
    }

    async fn mark_read_for_receiver(
        &self,
        receiver: UserId,
        other: UserId,
        vehicle_id: VehicleId,
        read_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.check_available()?;
        let mut messages = self.messages.write().await;
        let mut affected = 0;
        for message in messages.iter_mut().filter(|m| {
            m.receiver_id == receiver
                && m.sender_id == other
                && m.vehicle_id == vehicle_id
                && !m.is_read
        }) {
            message.is_read = true;
            message.read_at = Some(read_at);
            affected += 1;
        }
        Ok(affected)
    }
}
