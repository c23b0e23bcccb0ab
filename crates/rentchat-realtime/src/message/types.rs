//! Inbound intents and outbound events.
//!
//! Both directions are JSON objects tagged by a `type` field, e.g.
//! `{"type": "mark_as_read", "conversation_id": "..."}`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use rentchat_core::types::{ConversationId, UserId, VehicleId};
use rentchat_entity::{ConversationView, MessageView};

/// Payload of `send_message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SendMessagePayload {
    /// Addressee.
    #[serde(default, alias = "receiverId")]
    #[validate(required)]
    pub receiver_id: Option<UserId>,
    /// Vehicle the message is about.
    #[serde(default, alias = "vehicleId")]
    #[validate(required)]
    pub vehicle_id: Option<VehicleId>,
    /// Text body.
    #[serde(default)]
    #[validate(required)]
    pub content: Option<String>,
    /// Optional type tag.
    #[serde(default, alias = "messageType")]
    pub message_type: Option<String>,
}

/// Payload of `mark_as_read`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MarkAsReadPayload {
    /// Conversation to mark.
    #[serde(default, alias = "conversationId")]
    #[validate(required)]
    pub conversation_id: Option<ConversationId>,
}

/// Payload of `typing_start` and `typing_stop`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TypingPayload {
    /// Who should see the indicator.
    #[serde(default, alias = "receiverId")]
    #[validate(required)]
    pub receiver_id: Option<UserId>,
    /// Vehicle the thread is about.
    #[serde(default, alias = "vehicleId")]
    #[validate(required)]
    pub vehicle_id: Option<VehicleId>,
}

/// Intents sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundIntent {
    /// Send a message.
    SendMessage(SendMessagePayload),
    /// Mark a conversation as read.
    MarkAsRead(MarkAsReadPayload),
    /// Start showing a typing indicator.
    TypingStart(TypingPayload),
    /// Stop showing a typing indicator.
    TypingStop(TypingPayload),
    /// Announce presence to everyone else.
    UserOnline,
}

impl InboundIntent {
    /// Wire name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "send_message",
            Self::MarkAsRead(_) => "mark_as_read",
            Self::TypingStart(_) => "typing_start",
            Self::TypingStop(_) => "typing_stop",
            Self::UserOnline => "user_online",
        }
    }

    /// Message reported when a store failure aborts this intent.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "Error sending message",
            Self::MarkAsRead(_) => "Error marking messages as read",
            _ => "Internal server error",
        }
    }
}

/// Online state announced in `user_status_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Connected.
    Online,
    /// Disconnected.
    Offline,
}

/// Events pushed to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Confirmation to the sender.
    MessageSent {
        /// The stored message.
        message: MessageView,
        /// Its conversation.
        conversation_id: ConversationId,
    },
    /// Live delivery to the receiver.
    NewMessage {
        /// The stored message.
        message: MessageView,
        /// Its conversation.
        conversation_id: ConversationId,
    },
    /// Fresh inbox snapshot of one conversation.
    ConversationUpdated(ConversationView),
    /// The other participant read the conversation.
    MessagesRead {
        /// Conversation that was read.
        conversation_id: ConversationId,
        /// Who read it.
        read_by: UserId,
    },
    /// Confirmation to the reader.
    MessagesMarkedRead {
        /// Conversation that was read.
        conversation_id: ConversationId,
        /// Messages that flipped to read.
        count: u64,
    },
    /// Someone started typing.
    UserTyping {
        /// Who is typing.
        user_id: UserId,
        /// Their display name.
        user_name: String,
        /// Vehicle the thread is about.
        vehicle_id: VehicleId,
    },
    /// Someone stopped typing.
    UserStoppedTyping {
        /// Who stopped.
        user_id: UserId,
        /// Vehicle the thread is about.
        vehicle_id: VehicleId,
    },
    /// A user came online or went offline.
    UserStatusChange {
        /// The user.
        user_id: UserId,
        /// New state.
        status: PresenceStatus,
    },
    /// A rejected intent.
    Error {
        /// Error kind, e.g. `VALIDATION`.
        code: String,
        /// Human-readable reason.
        message: String,
    },
}
