//! Message entity model.

use chrono::{DateTime, Utc};
use rentchat_core::types::{ConversationKey, MessageId, UserId, VehicleId};
use rentchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Message type used when the client does not send one.
pub const DEFAULT_MESSAGE_TYPE: &str = "text";

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Time-ordered message identifier.
    pub id: MessageId,
    /// Author.
    pub sender_id: UserId,
    /// Addressee.
    pub receiver_id: UserId,
    /// Vehicle the thread is scoped to.
    pub vehicle_id: VehicleId,
    /// Text body.
    pub content: String,
    /// Free-form type tag, `"text"` unless the client says otherwise.
    pub message_type: String,
    /// Whether the receiver has read it.
    pub is_read: bool,
    /// When the receiver read it.
    pub read_at: Option<DateTime<Utc>>,
    /// Immutable creation time; defines ordering within a conversation.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The conversation key this message belongs to.
    pub fn conversation_key(&self) -> AppResult<ConversationKey> {
        ConversationKey::new(self.sender_id, self.receiver_id, self.vehicle_id)
    }
}

/// Data required to append a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Author.
    pub sender_id: UserId,
    /// Addressee.
    pub receiver_id: UserId,
    /// Vehicle scope.
    pub vehicle_id: VehicleId,
    /// Text body as the client sent it.
    pub content: String,
    /// Type tag.
    pub message_type: String,
}

impl NewMessage {
    /// Validates and normalizes an outgoing message.
    ///
    /// Whitespace-only content counts as empty; otherwise the content is kept
    /// exactly as sent. A missing or blank `message_type` falls back to
    /// [`DEFAULT_MESSAGE_TYPE`].
    pub fn new(
        sender_id: UserId,
        receiver_id: UserId,
        vehicle_id: VehicleId,
        content: &str,
        message_type: Option<&str>,
    ) -> AppResult<Self> {
        if sender_id == receiver_id {
            return Err(AppError::validation("Cannot send message to yourself"));
        }
        if content.trim().is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }
        let message_type = message_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_MESSAGE_TYPE);

        Ok(Self {
            sender_id,
            receiver_id,
            vehicle_id,
            content: content.to_string(),
            message_type: message_type.to_string(),
        })
    }

    /// Materializes the row with the given creation time.
    pub fn into_message(self, created_at: DateTime<Utc>) -> Message {
        Message {
            id: MessageId::new_ordered(),
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            vehicle_id: self.vehicle_id,
            content: self.content,
            message_type: self.message_type,
            is_read: false,
            read_at: None,
            created_at,
        }
    }
}
