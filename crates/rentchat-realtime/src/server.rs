//! Top-level chat engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use rentchat_auth::IdentityVerifier;
use rentchat_core::config::RealtimeConfig;
use rentchat_core::result::AppResult;
use rentchat_core::types::{SessionId, UserId};
use rentchat_entity::UserSummary;
use rentchat_service::{ChatService, RequestContext, SendMessageRequest};

use crate::connection::handle::{ConnectionHandle, SendOutcome};
use crate::connection::{ConnectionPool, WsAuthenticator};
use crate::message::types::{InboundIntent, OutboundEvent, PresenceStatus};
use crate::message::validator::{missing_fields, validate_payload};
use crate::metrics::RealtimeMetrics;
use crate::presence::PresenceRegistry;
use crate::session::{PendingSession, SessionHandler};

/// Central chat engine shared by every live connection of the process.
#[derive(Clone)]
pub struct ChatEngine {
    /// Chat use cases.
    pub chat: Arc<ChatService>,
    /// User → live session.
    pub presence: Arc<PresenceRegistry>,
    /// Every live connection.
    pub connections: Arc<ConnectionPool>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    authenticator: WsAuthenticator,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("connections", &self.connections.len())
            .field("online", &self.presence.online_count())
            .finish()
    }
}

impl ChatEngine {
    /// Create the engine over `chat`, verifying credentials with `verifier`.
    pub fn new(
        config: RealtimeConfig,
        chat: Arc<ChatService>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let authenticator = WsAuthenticator::new(verifier, config.auth_timeout());

        info!(
            auth_timeout_seconds = config.auth_timeout_seconds,
            channel_buffer_size = config.channel_buffer_size,
            "Chat engine initialized"
        );

        Self {
            chat,
            presence: Arc::new(PresenceRegistry::new()),
            connections: Arc::new(ConnectionPool::new()),
            metrics: Arc::new(RealtimeMetrics::new()),
            authenticator,
            config,
            shutdown_tx,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Start tracking a new connection in the `Connecting` state.
    pub fn begin_session(&self) -> PendingSession {
        PendingSession::new(self.clone())
    }

    /// Resolve a connection credential within the configured window.
    pub(crate) async fn authenticate(&self, credential: Option<&str>) -> AppResult<UserSummary> {
        self.authenticator.authenticate(credential).await
    }

    /// Open an active session for an authenticated `user`.
    ///
    /// Returns the session state machine and the receiving half of its
    /// outbound queue.
    pub(crate) fn open_session(&self, user: UserSummary) -> (SessionHandler, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user.clone(), tx));
        let mut session = SessionHandler::new(self.clone(), handle, RequestContext::new(user));
        session.activate();
        (session, rx)
    }

    /// Queue `event` on `handle`, counting the outcome.
    pub fn deliver(&self, handle: &ConnectionHandle, event: OutboundEvent) -> bool {
        match handle.send(event) {
            SendOutcome::Queued => {
                self.metrics.event_delivered();
                true
            }
            SendOutcome::Dropped | SendOutcome::Closed => {
                self.metrics.event_dropped();
                false
            }
        }
    }

    /// Deliver to the live session of `user_id`, if there is one.
    pub fn send_to_user(&self, user_id: UserId, event: OutboundEvent) -> bool {
        let Some(handle) = self
            .presence
            .lookup(user_id)
            .and_then(|session_id| self.connections.get(&session_id))
        else {
            return false;
        };
        self.deliver(&handle, event)
    }

    /// Deliver to every connection except `exclude`. Returns how many queued.
    pub fn broadcast_except(&self, exclude: SessionId, event: &OutboundEvent) -> usize {
        self.connections
            .others(&exclude)
            .iter()
            .filter(|handle| self.deliver(handle, event.clone()))
            .count()
    }

    /// Run one intent for the connection `handle`.
    pub(crate) async fn execute(
        &self,
        ctx: &RequestContext,
        handle: &ConnectionHandle,
        intent: InboundIntent,
    ) -> AppResult<()> {
        match intent {
            InboundIntent::SendMessage(payload) => {
                validate_payload(&payload)?;
                let (Some(receiver_id), Some(vehicle_id), Some(content)) =
                    (payload.receiver_id, payload.vehicle_id, payload.content)
                else {
                    return Err(missing_fields());
                };

                let sent = self
                    .chat
                    .send_message(
                        ctx,
                        SendMessageRequest {
                            receiver_id,
                            vehicle_id,
                            content,
                            message_type: payload.message_type,
                        },
                    )
                    .await?;

                self.deliver(
                    handle,
                    OutboundEvent::MessageSent {
                        message: sent.message.clone(),
                        conversation_id: sent.conversation_id,
                    },
                );
                let receiver_online = self.send_to_user(
                    receiver_id,
                    OutboundEvent::NewMessage {
                        message: sent.message,
                        conversation_id: sent.conversation_id,
                    },
                );
                self.deliver(
                    handle,
                    OutboundEvent::ConversationUpdated(sent.conversation.clone()),
                );
                if receiver_online {
                    self.send_to_user(
                        receiver_id,
                        OutboundEvent::ConversationUpdated(sent.conversation),
                    );
                }
                Ok(())
            }
            InboundIntent::MarkAsRead(payload) => {
                validate_payload(&payload)?;
                let conversation_id = payload.conversation_id.ok_or_else(missing_fields)?;
                let receipt = self.chat.mark_as_read(ctx, conversation_id).await?;

                self.deliver(
                    handle,
                    OutboundEvent::MessagesMarkedRead {
                        conversation_id: receipt.conversation_id,
                        count: receipt.count,
                    },
                );
                self.send_to_user(
                    receipt.other,
                    OutboundEvent::MessagesRead {
                        conversation_id: receipt.conversation_id,
                        read_by: receipt.reader,
                    },
                );
                Ok(())
            }
            InboundIntent::TypingStart(payload) => {
                validate_payload(&payload)?;
                let (Some(receiver_id), Some(vehicle_id)) =
                    (payload.receiver_id, payload.vehicle_id)
                else {
                    return Err(missing_fields());
                };
                self.send_to_user(
                    receiver_id,
                    OutboundEvent::UserTyping {
                        user_id: ctx.user_id(),
                        user_name: ctx.user.name.clone(),
                        vehicle_id,
                    },
                );
                Ok(())
            }
            InboundIntent::TypingStop(payload) => {
                validate_payload(&payload)?;
                let (Some(receiver_id), Some(vehicle_id)) =
                    (payload.receiver_id, payload.vehicle_id)
                else {
                    return Err(missing_fields());
                };
                self.send_to_user(
                    receiver_id,
                    OutboundEvent::UserStoppedTyping {
                        user_id: ctx.user_id(),
                        vehicle_id,
                    },
                );
                Ok(())
            }
            InboundIntent::UserOnline => {
                let reached = self.broadcast_except(
                    handle.id,
                    &OutboundEvent::UserStatusChange {
                        user_id: ctx.user_id(),
                        status: PresenceStatus::Online,
                    },
                );
                debug!(user_id = %ctx.user_id(), reached, "Presence announced");
                Ok(())
            }
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every connection task to stop and mark all handles dead.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("Shutting down chat engine");

        if self.shutdown_tx.send(()).is_err() {
            debug!("No connection task was listening for shutdown");
        }

        let all = self.connections.all();
        for handle in &all {
            handle.mark_dead();
        }
        if !all.is_empty() {
            warn!(count = all.len(), "Closed live connections on shutdown");
        }

        info!("Chat engine shut down");
        Ok(())
    }
}
