//! Message append, listing and read flags.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use rentchat_core::result::AppResult;
use rentchat_core::types::{UserId, VehicleId};
use rentchat_database::{MessageStore, UserDirectory};
use rentchat_entity::{Conversation, Message, MessageView, NewMessage, UserSummary};

/// Durable message operations.
#[derive(Debug, Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
}

impl MessageService {
    /// Create a message service.
    pub fn new(messages: Arc<dyn MessageStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { messages, users }
    }

    /// Persist a validated message created at `created_at`.
    pub async fn append(&self, new: NewMessage, created_at: DateTime<Utc>) -> AppResult<Message> {
        let message = new.into_message(created_at);
        self.messages.insert(&message).await?;
        debug!(
            message_id = %message.id,
            sender_id = %message.sender_id,
            receiver_id = %message.receiver_id,
            "Message stored"
        );
        Ok(message)
    }

    /// Remove a stored message whose conversation update failed.
    ///
    /// A failed removal is logged; the caller already reports the original
    /// error.
    pub async fn discard(&self, message: &Message) {
        if let Err(e) = self.messages.delete(message.id).await {
            error!(
                message_id = %message.id,
                error = %e,
                "Failed to remove message after conversation update failed"
            );
        }
    }

    /// All messages of `conversation`, oldest first, with sender and
    /// receiver expanded.
    pub async fn list_for_conversation(
        &self,
        conversation: &Conversation,
    ) -> AppResult<Vec<MessageView>> {
        let messages = self.messages.list_for_scope(&conversation.key()).await?;

        let mut people: HashMap<UserId, UserSummary> = HashMap::with_capacity(2);
        for id in conversation.participants.as_array() {
            let summary = self
                .users
                .find_user(id)
                .await?
                .unwrap_or_else(|| UserSummary::unknown(id));
            people.insert(id, summary);
        }

        Ok(messages
            .into_iter()
            .map(|m| {
                let sender = lookup(&people, m.sender_id);
                let receiver = lookup(&people, m.receiver_id);
                MessageView::new(m, sender, receiver)
            })
            .collect())
    }

    /// Mark every unread message from `other` to `receiver` about
    /// `vehicle_id` as read. Zero affected rows is not an error.
    pub async fn mark_all_read_for_receiver(
        &self,
        receiver: UserId,
        other: UserId,
        vehicle_id: VehicleId,
    ) -> AppResult<u64> {
        self.messages
            .mark_read_for_receiver(receiver, other, vehicle_id, Utc::now())
            .await
    }
}

fn lookup(people: &HashMap<UserId, UserSummary>, id: UserId) -> UserSummary {
    people
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UserSummary::unknown(id))
}
