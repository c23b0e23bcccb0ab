//! Shared value types: identifiers, conversation keys, unread counters.

pub mod id;
pub mod participants;
pub mod unread;

pub use id::{ConversationId, MessageId, SessionId, UserId, VehicleId};
pub use participants::{ConversationKey, ParticipantPair};
pub use unread::UnreadCounts;
