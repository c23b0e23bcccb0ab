//! Minimal user summary resolved from the marketplace `users` table.

use rentchat_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identity and display data for a chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar: Option<String>,
}

impl UserSummary {
    /// Create a summary.
    pub fn new(id: UserId, name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar,
        }
    }

    /// Stand-in for a user whose row no longer exists.
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            name: "Unknown user".to_string(),
            avatar: None,
        }
    }
}
