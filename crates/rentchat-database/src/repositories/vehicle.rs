//! Read-only access to the marketplace `vehicles` table.

use async_trait::async_trait;
use sqlx::PgPool;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::VehicleId;
use rentchat_entity::Vehicle;

use crate::store::VehicleCatalog;

/// Resolves vehicles and their owners from PostgreSQL.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    /// Create a new vehicle repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleCatalog for VehicleRepository {
    async fn find_vehicle(&self, id: VehicleId) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT id, user_id, name, image_url, category FROM vehicles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to find vehicle", e))
    }
}
