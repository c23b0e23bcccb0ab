//! Credential → user resolution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_database::UserDirectory;
use rentchat_entity::UserSummary;

use crate::jwt::JwtDecoder;

/// Resolves a bearer credential to the user it was issued for.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify `credential`, failing with an authentication error.
    async fn verify(&self, credential: &str) -> AppResult<UserSummary>;
}

/// Verifier for HS256 tokens whose `sub` is a marketplace user id.
#[derive(Debug, Clone)]
pub struct JwtIdentityVerifier {
    decoder: JwtDecoder,
    users: Arc<dyn UserDirectory>,
}

impl JwtIdentityVerifier {
    /// Create a verifier that resolves subjects through `users`.
    pub fn new(decoder: JwtDecoder, users: Arc<dyn UserDirectory>) -> Self {
        Self { decoder, users }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, credential: &str) -> AppResult<UserSummary> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AppError::authentication("Authentication required"));
        }

        let claims = self.decoder.decode(credential)?;
        let user_id = claims.user_id();
        match self.users.find_user(user_id).await? {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = %user_id, "Token subject has no user row");
                Err(AppError::authentication("User not found"))
            }
        }
    }
}
