//! Message repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{ConversationKey, MessageId, UserId, VehicleId};
use rentchat_entity::Message;

use crate::store::MessageStore;

/// Repository for message rows.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, message: &Message) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO messages \
             (id, sender_id, receiver_id, vehicle_id, content, message_type, is_read, read_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.vehicle_id)
        .bind(&message.content)
        .bind(&message.message_type)
        .bind(message.is_read)
        .bind(message.read_at)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to insert message", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to find message", e))
    }

    async fn delete(&self, id: MessageId) -> AppResult<()> {
        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to delete message", e))?;
        Ok(())
    }

    async fn list_for_scope(&self, key: &ConversationKey) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages \
             WHERE vehicle_id = $1 \
               AND ((sender_id = $2 AND receiver_id = $3) OR (sender_id = $3 AND receiver_id = $2)) \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(key.vehicle_id)
        .bind(key.participants.first())
        .bind(key.participants.second())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list messages", e))
    }

    async fn mark_read_for_receiver(
        &self,
        receiver: UserId,
        other: UserId,
        vehicle_id: VehicleId,
        read_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE, read_at = $4 \
             WHERE receiver_id = $1 AND sender_id = $2 AND vehicle_id = $3 AND is_read = FALSE",
        )
        .bind(receiver)
        .bind(other)
        .bind(vehicle_id)
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_sqlx("Failed to mark messages as read", e)
        })?;
        Ok(result.rows_affected())
    }
}
