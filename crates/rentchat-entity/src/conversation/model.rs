//! Conversation entity model.

use chrono::{DateTime, Utc};
use rentchat_core::types::{
    ConversationId, ConversationKey, MessageId, ParticipantPair, UnreadCounts, UserId, VehicleId,
};
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// A two-party thread scoped to one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Normalized participants.
    pub participants: ParticipantPair,
    /// Vehicle scope.
    pub vehicle_id: VehicleId,
    /// Most recent message, if any.
    pub last_message_id: Option<MessageId>,
    /// Time of last activity; inbox sort key.
    pub last_message_at: DateTime<Utc>,
    /// Unread messages per participant.
    pub unread_count: UnreadCounts,
    /// When the record was first persisted.
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// A fresh, unpersisted conversation for `key`, opened by a message to
    /// `receiver`.
    pub fn new(key: ConversationKey, receiver: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ConversationId::new(),
            participants: key.participants,
            vehicle_id: key.vehicle_id,
            last_message_id: None,
            last_message_at: now,
            unread_count: UnreadCounts::for_new_conversation(receiver),
            created_at: now,
            updated_at: now,
        }
    }

    /// The lookup key of this conversation.
    pub fn key(&self) -> ConversationKey {
        ConversationKey {
            participants: self.participants,
            vehicle_id: self.vehicle_id,
        }
    }

    /// Whether `user_id` is one of the two participants.
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// Unread count for `user_id`.
    pub fn unread_for(&self, user_id: UserId) -> u32 {
        self.unread_count.get(user_id)
    }

    /// Point at `message` as the latest one and count it unread for its
    /// receiver.
    pub fn record(&mut self, message: &Message, now: DateTime<Utc>) {
        self.last_message_id = Some(message.id);
        self.last_message_at = message.created_at;
        self.unread_count.increment(message.receiver_id);
        self.updated_at = now;
    }
}
