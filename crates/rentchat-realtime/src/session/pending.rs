//! Connections whose credential has not been accepted yet.

use tokio::sync::mpsc;
use tracing::debug;

use rentchat_core::result::AppResult;
use rentchat_entity::UserSummary;

use super::handler::SessionHandler;
use super::state::ConnectionState;
use crate::message::types::OutboundEvent;
use crate::server::ChatEngine;

/// A new connection in the `Connecting` state.
#[derive(Debug)]
pub struct PendingSession {
    engine: ChatEngine,
    state: ConnectionState,
}

/// A connection whose credential resolved to a user but which is not yet
/// registered for presence or delivery.
#[derive(Debug)]
pub struct AuthenticatedSession {
    engine: ChatEngine,
    user: UserSummary,
}

impl PendingSession {
    pub(crate) fn new(engine: ChatEngine) -> Self {
        Self {
            engine,
            state: ConnectionState::Connecting,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check `credential` within the engine's authentication window.
    ///
    /// On failure the connection ends in `Disconnected` and is counted as
    /// refused; the server never retries.
    pub async fn authenticate(
        mut self,
        credential: Option<&str>,
    ) -> AppResult<AuthenticatedSession> {
        match self.engine.authenticate(credential).await {
            Ok(user) => {
                self.state = ConnectionState::Authenticated;
                Ok(AuthenticatedSession {
                    engine: self.engine,
                    user,
                })
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                self.engine.metrics.connection_refused();
                debug!(state = %self.state, error = %e, "Connection refused");
                Err(e)
            }
        }
    }
}

impl AuthenticatedSession {
    /// The user the credential resolved to.
    pub fn user(&self) -> &UserSummary {
        &self.user
    }

    /// Register the connection and start accepting intents.
    pub fn activate(self) -> (SessionHandler, mpsc::Receiver<OutboundEvent>) {
        self.engine.open_session(self.user)
    }
}
