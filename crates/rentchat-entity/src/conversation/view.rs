//! Conversation snapshot as shown in an inbox.

use chrono::{DateTime, Utc};
use rentchat_core::types::{ConversationId, MessageId, UnreadCounts};
use serde::{Deserialize, Serialize};

use super::model::Conversation;
use crate::message::Message;
use crate::user::UserSummary;
use crate::vehicle::VehicleSummary;

/// Latest-message preview embedded in a conversation view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreview {
    /// Message identifier.
    pub id: MessageId,
    /// Text body.
    pub content: String,
    /// Type tag.
    pub message_type: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessagePreview {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            message_type: message.message_type.clone(),
            created_at: message.created_at,
        }
    }
}

/// A conversation with participants, vehicle and last message populated.
///
/// `id` is `None` and `is_new` is `true` for the placeholder returned when two
/// users have never exchanged a message about a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationView {
    /// Conversation identifier, absent for a placeholder.
    pub id: Option<ConversationId>,
    /// Both participants.
    pub participants: Vec<UserSummary>,
    /// Vehicle the thread is about.
    pub vehicle: VehicleSummary,
    /// Latest message.
    pub last_message: Option<MessagePreview>,
    /// Time of last activity.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Unread messages per participant.
    pub unread_count: UnreadCounts,
    /// Whether this is an unpersisted placeholder.
    pub is_new: bool,
}

impl ConversationView {
    /// Populate a persisted conversation.
    pub fn from_conversation(
        conversation: &Conversation,
        participants: Vec<UserSummary>,
        vehicle: VehicleSummary,
        last_message: Option<MessagePreview>,
    ) -> Self {
        Self {
            id: Some(conversation.id),
            participants,
            vehicle,
            last_message,
            last_message_at: Some(conversation.last_message_at),
            unread_count: conversation.unread_count.clone(),
            is_new: false,
        }
    }

    /// A placeholder for a pair that has not talked about `vehicle` yet.
    pub fn placeholder(participants: Vec<UserSummary>, vehicle: VehicleSummary) -> Self {
        Self {
            id: None,
            participants,
            vehicle,
            last_message: None,
            last_message_at: None,
            unread_count: UnreadCounts::new(),
            is_new: true,
        }
    }
}
