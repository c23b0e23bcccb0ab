//! Store traits consumed by the chat services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rentchat_core::result::AppResult;
use rentchat_core::types::{ConversationId, ConversationKey, MessageId, UserId, VehicleId};
use rentchat_entity::{Conversation, Message, UserSummary, Vehicle};

/// Durable record of two-party, vehicle-scoped conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a conversation by id.
    async fn find_by_id(&self, id: ConversationId) -> AppResult<Option<Conversation>>;

    /// Find the conversation for a (pair, vehicle) key.
    async fn find_by_key(&self, key: &ConversationKey) -> AppResult<Option<Conversation>>;

    /// Record `message` on the conversation for `key`, creating the
    /// conversation when absent, as one atomic step.
    ///
    /// A created record starts from `unread_count = {receiver: 0}` before the
    /// receiver's counter is incremented, so the sender never gets an entry.
    /// Two concurrent calls for the same key resolve to the same record and
    /// both increments land.
    async fn record_message(&self, key: &ConversationKey, message: &Message)
    -> AppResult<Conversation>;

    /// Reset the unread counter of `user_id` to zero.
    async fn mark_read(&self, id: ConversationId, user_id: UserId) -> AppResult<Conversation>;

    /// All conversations `user_id` participates in, newest activity first.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Conversation>>;

    /// Sum of the unread counters of `user_id` across all conversations.
    async fn total_unread(&self, user_id: UserId) -> AppResult<u64>;

    /// Reachability check used by the health endpoint.
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Durable, ordered record of chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new message.
    async fn insert(&self, message: &Message) -> AppResult<()>;

    /// Find a message by id.
    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>>;

    /// Remove a message whose conversation could not be updated.
    async fn delete(&self, id: MessageId) -> AppResult<()>;

    /// Messages exchanged between the key's participants about its vehicle,
    /// oldest first (`created_at`, then `id`).
    async fn list_for_scope(&self, key: &ConversationKey) -> AppResult<Vec<Message>>;

    /// Mark every unread message from `other` to `receiver` about `vehicle_id`
    /// as read. Returns the number of rows changed.
    async fn mark_read_for_receiver(
        &self,
        receiver: UserId,
        other: UserId,
        vehicle_id: VehicleId,
        read_at: DateTime<Utc>,
    ) -> AppResult<u64>;
}

/// Read access to marketplace users.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a user summary.
    async fn find_user(&self, id: UserId) -> AppResult<Option<UserSummary>>;
}

/// Read access to the vehicle catalog.
#[async_trait]
pub trait VehicleCatalog: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a vehicle and its owner.
    async fn find_vehicle(&self, id: VehicleId) -> AppResult<Option<Vehicle>>;
}
