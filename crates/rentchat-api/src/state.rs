//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use rentchat_auth::IdentityVerifier;
use rentchat_core::config::AppConfig;
use rentchat_database::ConversationStore;
use rentchat_realtime::ChatEngine;
use rentchat_service::ChatService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token verifier
    pub verifier: Arc<dyn IdentityVerifier>,

    // ── Chat ─────────────────────────────────────────────────
    /// Chat use cases
    pub chat: Arc<ChatService>,
    /// Live connection engine
    pub engine: ChatEngine,
    /// Conversation store, pinged by the health check
    pub conversations: Arc<dyn ConversationStore>,

    /// Process start, for uptime
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state; HTTP queries share the engine's chat service.
    pub fn new(
        config: AppConfig,
        verifier: Arc<dyn IdentityVerifier>,
        engine: ChatEngine,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
            chat: engine.chat.clone(),
            engine,
            conversations,
            started_at: Instant::now(),
        }
    }
}
