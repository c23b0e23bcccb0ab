//! Read-only access to the marketplace `users` table.

use async_trait::async_trait;
use sqlx::PgPool;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::UserId;
use rentchat_entity::UserSummary;

use crate::store::UserDirectory;

/// Resolves user summaries from PostgreSQL.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_user(&self, id: UserId) -> AppResult<Option<UserSummary>> {
        sqlx::query_as::<_, UserSummary>("SELECT id, name, avatar FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to find user", e))
    }
}
