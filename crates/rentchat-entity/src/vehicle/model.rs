//! Vehicle rows as read from the marketplace catalog.

use rentchat_core::types::{UserId, VehicleId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A listed vehicle. Only the fields chat needs are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    /// Vehicle identifier.
    pub id: VehicleId,
    /// The user who listed the vehicle.
    #[sqlx(rename = "user_id")]
    pub owner_id: UserId,
    /// Listing title.
    pub name: String,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Listing category (car, bike, ...).
    pub category: Option<String>,
}

impl Vehicle {
    /// Whether `user_id` listed this vehicle.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Public summary embedded in conversation views.
    pub fn summary(&self) -> VehicleSummary {
        VehicleSummary {
            id: self.id,
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
        }
    }
}

/// Vehicle fields shown next to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSummary {
    /// Vehicle identifier.
    pub id: VehicleId,
    /// Listing title.
    pub name: String,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Listing category.
    pub category: Option<String>,
}
