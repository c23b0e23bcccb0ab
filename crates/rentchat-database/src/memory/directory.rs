//! In-memory user directory and vehicle catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rentchat_core::config::SeedConfig;
use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{UserId, VehicleId};
use rentchat_entity::{UserSummary, Vehicle};

use crate::store::{UserDirectory, VehicleCatalog};

/// Seedable stand-in for the marketplace `users` and `vehicles` tables.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<UserId, UserSummary>>,
    vehicles: RwLock<HashMap<VehicleId, Vehicle>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub async fn insert_user(&self, user: UserSummary) {
        self.users.write().await.insert(user.id, user);
    }

    /// Add or replace a vehicle.
    pub async fn insert_vehicle(&self, vehicle: Vehicle) {
        self.vehicles.write().await.insert(vehicle.id, vehicle);
    }

    /// Load the configured users and vehicles.
    ///
    /// Every vehicle owner must be one of the seeded users.
    pub async fn seed(&self, seed: &SeedConfig) -> AppResult<()> {
        let mut users = self.users.write().await;
        for user in &seed.users {
            users.insert(
                user.id,
                UserSummary::new(user.id, user.name.clone(), user.avatar.clone()),
            );
        }

        let mut vehicles = self.vehicles.write().await;
        for vehicle in &seed.vehicles {
            if !users.contains_key(&vehicle.owner_id) {
                return Err(AppError::configuration(format!(
                    "Seed vehicle {} names unknown owner {}",
                    vehicle.id, vehicle.owner_id
                )));
            }
            vehicles.insert(
                vehicle.id,
                Vehicle {
                    id: vehicle.id,
                    owner_id: vehicle.owner_id,
                    name: vehicle.name.clone(),
                    image_url: vehicle.image_url.clone(),
                    category: vehicle.category.clone(),
                },
            );
        }
        Ok(())
    }

    /// Remove a user, as if their account was deleted.
    pub async fn remove_user(&self, id: UserId) {
        self.users.write().await.remove(&id);
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_user(&self, id: UserId) -> AppResult<Option<UserSummary>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl VehicleCatalog for MemoryDirectory {
    async fn find_vehicle(&self, id: VehicleId) -> AppResult<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(&id).cloned())
    }
}
