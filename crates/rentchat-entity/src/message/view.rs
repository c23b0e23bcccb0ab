//! Message with sender and receiver expanded.

use chrono::{DateTime, Utc};
use rentchat_core::types::{MessageId, VehicleId};
use serde::{Deserialize, Serialize};

use super::model::Message;
use crate::user::UserSummary;

/// A message as delivered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    /// Message identifier.
    pub id: MessageId,
    /// Author summary.
    pub sender: UserSummary,
    /// Addressee summary.
    pub receiver: UserSummary,
    /// Vehicle scope.
    pub vehicle_id: VehicleId,
    /// Text body.
    pub content: String,
    /// Type tag.
    pub message_type: String,
    /// Read flag.
    pub is_read: bool,
    /// Read time.
    pub read_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    /// Expand `message` with the given participant summaries.
    pub fn new(message: Message, sender: UserSummary, receiver: UserSummary) -> Self {
        Self {
            id: message.id,
            sender,
            receiver,
            vehicle_id: message.vehicle_id,
            content: message.content,
            message_type: message.message_type,
            is_read: message.is_read,
            read_at: message.read_at,
            created_at: message.created_at,
        }
    }
}
