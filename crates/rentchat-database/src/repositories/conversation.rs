//! Conversation repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{
    ConversationId, ConversationKey, MessageId, ParticipantPair, UnreadCounts, UserId, VehicleId,
};
use rentchat_entity::{Conversation, Message};

use crate::store::ConversationStore;

const COLUMNS: &str = "id, participant_a, participant_b, vehicle_id, last_message_id, \
                       last_message_at, unread_count, created_at, updated_at";

/// Row shape of the `conversations` table.
#[derive(Debug, FromRow)]
struct ConversationRow {
    id: ConversationId,
    participant_a: UserId,
    participant_b: UserId,
    vehicle_id: VehicleId,
    last_message_id: Option<MessageId>,
    last_message_at: DateTime<Utc>,
    unread_count: Json<UnreadCounts>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = AppError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            participants: ParticipantPair::from_ids([row.participant_a, row.participant_b])?,
            vehicle_id: row.vehicle_id,
            last_message_id: row.last_message_id,
            last_message_at: row.last_message_at,
            unread_count: row.unread_count.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for conversation rows.
#[derive(Debug, Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    /// Create a new conversation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_returning(
        &self,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, ConversationRow, sqlx::postgres::PgArguments>,
        context: &'static str,
    ) -> AppResult<Conversation> {
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(context, e))?
            .ok_or_else(|| AppError::not_found("Conversation not found"))?;
        row.try_into()
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn find_by_id(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        let sql = format!("SELECT {COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_sqlx("Failed to find conversation", e)
            })?
            .map(Conversation::try_from)
            .transpose()
    }

    async fn find_by_key(&self, key: &ConversationKey) -> AppResult<Option<Conversation>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM conversations \
             WHERE participant_a = $1 AND participant_b = $2 AND vehicle_id = $3"
        );
        sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(key.participants.first())
            .bind(key.participants.second())
            .bind(key.vehicle_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_sqlx("Failed to find conversation by key", e)
            })?
            .map(Conversation::try_from)
            .transpose()
    }

    async fn record_message(
        &self,
        key: &ConversationKey,
        message: &Message,
    ) -> AppResult<Conversation> {
        let sql = format!(
            "INSERT INTO conversations \
             (id, participant_a, participant_b, vehicle_id, last_message_id, last_message_at, \
              unread_count, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, jsonb_build_object($7::text, 1), $6, NOW()) \
             ON CONFLICT (participant_a, participant_b, vehicle_id) DO UPDATE SET \
                 last_message_id = EXCLUDED.last_message_id, \
                 last_message_at = EXCLUDED.last_message_at, \
                 unread_count = jsonb_set(conversations.unread_count, ARRAY[$7::text], \
                     to_jsonb(COALESCE((conversations.unread_count ->> $7::text)::int, 0) + 1), true), \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        let query = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(ConversationId::new())
            .bind(key.participants.first())
            .bind(key.participants.second())
            .bind(key.vehicle_id)
            .bind(message.id)
            .bind(message.created_at)
            .bind(message.receiver_id.to_string());
        self.fetch_one_returning(query, "Failed to record message on conversation")
            .await
    }

    async fn mark_read(&self, id: ConversationId, user_id: UserId) -> AppResult<Conversation> {
        let sql = format!(
            "UPDATE conversations SET \
                 unread_count = jsonb_set(unread_count, ARRAY[$2::text], '0'::jsonb, true), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let query = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(id)
            .bind(user_id.to_string());
        self.fetch_one_returning(query, "Failed to reset unread count")
            .await
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Conversation>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM conversations \
             WHERE participant_a = $1 OR participant_b = $1 \
             ORDER BY last_message_at DESC"
        );
        sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_sqlx("Failed to list conversations", e)
            })?
            .into_iter()
            .map(Conversation::try_from)
            .collect()
    }

    async fn total_unread(&self, user_id: UserId) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(COALESCE((unread_count ->> $2::text)::bigint, 0)), 0)::bigint \
             FROM conversations WHERE participant_a = $1 OR participant_b = $1",
        )
        .bind(user_id)
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to sum unread counts", e))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::from_sqlx("Health check failed", e))
    }
}
