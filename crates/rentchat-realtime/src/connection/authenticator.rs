//! Credential check for new connections, bounded in time.

use std::sync::Arc;
use std::time::Duration;

use rentchat_auth::IdentityVerifier;
use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_entity::UserSummary;

/// Resolves a connection credential within a fixed window.
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    verifier: Arc<dyn IdentityVerifier>,
    timeout: Duration,
}

impl WsAuthenticator {
    /// Create an authenticator that gives up after `timeout`.
    pub fn new(verifier: Arc<dyn IdentityVerifier>, timeout: Duration) -> Self {
        Self { verifier, timeout }
    }

    /// Verify `credential`; a missing credential fails immediately.
    pub async fn authenticate(&self, credential: Option<&str>) -> AppResult<UserSummary> {
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::authentication("Authentication required"))?;

        tokio::time::timeout(self.timeout, self.verifier.verify(credential))
            .await
            .map_err(|_| AppError::timeout("Authentication timed out"))?
    }
}
