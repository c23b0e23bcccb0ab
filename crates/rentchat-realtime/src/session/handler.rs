//! Per-connection intent dispatch.

use std::sync::Arc;

use tracing::{debug, error, info};

use rentchat_core::error::AppError;
use rentchat_core::types::SessionId;
use rentchat_entity::UserSummary;
use rentchat_service::RequestContext;

use crate::connection::ConnectionHandle;
use crate::message::serializer::deserialize_intent;
use crate::message::types::{InboundIntent, OutboundEvent, PresenceStatus};
use crate::message::validator::validate_frame;
use crate::server::ChatEngine;

use super::state::ConnectionState;

/// Drives one live connection from authentication to disconnect.
///
/// Intents are processed one at a time in arrival order. Each intent runs on
/// its own task that the handler awaits, so a dropped socket never cancels a
/// store write half way through. Dropping the handler disconnects it.
#[derive(Debug)]
pub struct SessionHandler {
    engine: ChatEngine,
    handle: Arc<ConnectionHandle>,
    ctx: RequestContext,
    state: ConnectionState,
}

impl SessionHandler {
    pub(crate) fn new(engine: ChatEngine, handle: Arc<ConnectionHandle>, ctx: RequestContext) -> Self {
        Self {
            engine,
            handle,
            ctx,
            state: ConnectionState::Authenticated,
        }
    }

    /// Register the connection and start accepting intents.
    pub(crate) fn activate(&mut self) {
        if !self.transition(ConnectionState::Active) {
            return;
        }
        self.engine.connections.add(self.handle.clone());
        let previous = self
            .engine
            .presence
            .register(self.ctx.user_id(), self.handle.id, self.ctx.user.clone());
        self.engine.metrics.connection_opened();

        info!(
            conn_id = %self.handle.id,
            user_id = %self.ctx.user_id(),
            replaced = previous.is_some(),
            "Live connection established"
        );
    }

    /// Session id of this connection.
    pub fn session_id(&self) -> SessionId {
        self.handle.id
    }

    /// The authenticated user.
    pub fn user(&self) -> &UserSummary {
        &self.ctx.user
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Handle one inbound text frame.
    pub async fn handle_text(&mut self, raw: &str) {
        self.engine.metrics.intent_received();

        if let Err(e) = validate_frame(raw, self.engine.config().max_message_bytes) {
            self.report(&e, "Internal server error");
            return;
        }

        match deserialize_intent(raw) {
            Ok(intent) => self.dispatch(intent).await,
            Err(e) => {
                let err = AppError::validation(format!("Invalid message format: {e}"));
                self.report(&err, "Internal server error");
            }
        }
    }

    /// Run a parsed intent to completion.
    ///
    /// Any failure produces exactly one `error` event to this connection.
    pub async fn dispatch(&mut self, intent: InboundIntent) {
        if !self.state.accepts_intents() {
            debug!(conn_id = %self.handle.id, state = %self.state, "Ignoring intent on inactive connection");
            return;
        }

        let name = intent.name();
        let failure_message = intent.failure_message();
        debug!(conn_id = %self.handle.id, user_id = %self.ctx.user_id(), intent = name, "Processing intent");

        let engine = self.engine.clone();
        let ctx = self.ctx.clone();
        let handle = self.handle.clone();
        let result = tokio::spawn(async move { engine.execute(&ctx, &handle, intent).await })
            .await
            .unwrap_or_else(|e| Err(AppError::internal(format!("Intent task failed: {e}"))));

        if let Err(err) = result {
            self.report(&err, failure_message);
        }
    }

    /// Tear the connection down. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if !self.transition(ConnectionState::Disconnected) {
            return;
        }

        self.handle.mark_dead();
        self.engine.connections.remove(&self.handle.id);

        let user_id = self.ctx.user_id();
        if self.engine.presence.unregister_session(user_id, self.handle.id) {
            self.engine.broadcast_except(
                self.handle.id,
                &OutboundEvent::UserStatusChange {
                    user_id,
                    status: PresenceStatus::Offline,
                },
            );
        }
        self.engine.metrics.connection_closed();

        info!(conn_id = %self.handle.id, user_id = %user_id, "Live connection closed");
    }

    fn transition(&mut self, next: ConnectionState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        true
    }

    fn report(&self, err: &AppError, failure_message: &str) {
        let message = if err.is_client_facing() {
            debug!(conn_id = %self.handle.id, error = %err, "Intent rejected");
            err.message.clone()
        } else {
            error!(conn_id = %self.handle.id, user_id = %self.ctx.user_id(), error = %err, "Intent failed");
            failure_message.to_string()
        };

        self.engine.deliver(
            &self.handle,
            OutboundEvent::Error {
                code: err.kind.to_string(),
                message,
            },
        );
        self.engine.metrics.error_emitted();
    }
}

impl Drop for SessionHandler {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use rentchat_core::types::{ConversationId, UserId, VehicleId};

    use crate::message::types::{MarkAsReadPayload, SendMessagePayload, TypingPayload};
    use crate::testing::{connect, drain, world};

    use super::*;

    fn send(to: &UserSummary, vehicle: VehicleId, content: &str) -> String {
        serde_json::json!({
            "type": "send_message",
            "receiver_id": to.id,
            "vehicle_id": vehicle,
            "content": content,
        })
        .to_string()
    }

    fn single_error(events: Vec<OutboundEvent>) -> (String, String) {
        assert_eq!(events.len(), 1, "expected exactly one event, got {events:?}");
        match events.into_iter().next() {
            Some(OutboundEvent::Error { code, message }) => (code, message),
            other => panic!("expected error event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_renter_message_reaches_online_owner() {
        let w = world().await;
        let (_owner, mut owner_rx) = connect(&w.engine, &w.owner);
        let (mut renter, mut renter_rx) = connect(&w.engine, &w.renter);

        renter.handle_text(&send(&w.owner, w.vehicle, "Hi")).await;

        let to_renter = drain(&mut renter_rx);
        assert_eq!(to_renter.len(), 2);
        let conversation_id = match &to_renter[0] {
            OutboundEvent::MessageSent { message, conversation_id } => {
                assert_eq!(message.content, "Hi");
                assert_eq!(message.sender.id, w.renter.id);
                *conversation_id
            }
            other => panic!("unexpected {other:?}"),
        };
        assert!(matches!(to_renter[1], OutboundEvent::ConversationUpdated(_)));

        let to_owner = drain(&mut owner_rx);
        assert_eq!(to_owner.len(), 2);
        match &to_owner[0] {
            OutboundEvent::NewMessage { message, conversation_id: id } => {
                assert_eq!(*id, conversation_id);
                assert_eq!(message.receiver.id, w.owner.id);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &to_owner[1] {
            OutboundEvent::ConversationUpdated(view) => {
                assert_eq!(view.id, Some(conversation_id));
                assert_eq!(view.unread_count.get(w.owner.id), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_offline_receiver_still_persists() {
        let w = world().await;
        let (mut renter, mut renter_rx) = connect(&w.engine, &w.renter);

        renter.handle_text(&send(&w.owner, w.vehicle, "Anyone there?")).await;

        assert_eq!(drain(&mut renter_rx).len(), 2);
        let owner_ctx = RequestContext::new(w.owner.clone());
        let inbox = w.engine.chat.list_conversations(&owner_ctx).await.expect("inbox");
        assert_eq!(inbox.len(), 1);
        assert_eq!(w.engine.chat.unread_count(&owner_ctx).await.expect("unread"), 1);
    }

    #[tokio::test]
    async fn test_stranger_is_denied_with_one_error() {
        let w = world().await;
        let (_owner, mut owner_rx) = connect(&w.engine, &w.owner);
        let (mut stranger, mut stranger_rx) = connect(&w.engine, &w.stranger);

        stranger.handle_text(&send(&w.renter, w.vehicle, "hello")).await;

        let (code, message) = single_error(drain(&mut stranger_rx));
        assert_eq!(code, "AUTHORIZATION");
        assert_eq!(
            message,
            "You can only message the vehicle owner or participants in existing conversations"
        );
        assert!(drain(&mut owner_rx).is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let w = world().await;
        let (mut renter, mut rx) = connect(&w.engine, &w.renter);

        renter
            .dispatch(InboundIntent::SendMessage(SendMessagePayload {
                receiver_id: Some(w.owner.id),
                vehicle_id: None,
                content: Some("Hi".to_string()),
                message_type: None,
            }))
            .await;

        let (code, message) = single_error(drain(&mut rx));
        assert_eq!(code, "VALIDATION");
        assert_eq!(message, "Missing required fields");
    }

    #[tokio::test]
    async fn test_malformed_and_oversized_frames() {
        let w = world().await;
        let (mut renter, mut rx) = connect(&w.engine, &w.renter);

        renter.handle_text("{not json").await;
        let (code, _) = single_error(drain(&mut rx));
        assert_eq!(code, "VALIDATION");

        let huge = "x".repeat(w.engine.config().max_message_bytes + 1);
        renter.handle_text(&huge).await;
        let (code, message) = single_error(drain(&mut rx));
        assert_eq!(code, "VALIDATION");
        assert!(message.starts_with("Message exceeds maximum size"));

        renter.handle_text(r#"{"type":"fly_away"}"#).await;
        assert_eq!(single_error(drain(&mut rx)).0, "VALIDATION");
    }

    #[tokio::test]
    async fn test_store_failure_reports_generic_message() {
        let w = world().await;
        let (_owner, mut owner_rx) = connect(&w.engine, &w.owner);
        let (mut renter, mut rx) = connect(&w.engine, &w.renter);
        w.messages.set_unavailable(true);

        renter.handle_text(&send(&w.owner, w.vehicle, "Hi")).await;

        let (code, message) = single_error(drain(&mut rx));
        assert_eq!(code, "DATABASE");
        assert_eq!(message, "Error sending message");
        assert!(drain(&mut owner_rx).is_empty());
        assert!(w.conversations.is_empty().await);
        assert!(w.messages.is_empty().await);
    }

    #[tokio::test]
    async fn test_conversation_store_failure_is_invisible_to_receiver() {
        let w = world().await;
        let (_owner, mut owner_rx) = connect(&w.engine, &w.owner);
        let (mut renter, mut rx) = connect(&w.engine, &w.renter);
        w.conversations.set_unavailable(true);

        renter.handle_text(&send(&w.owner, w.vehicle, "Hi")).await;

        let (code, message) = single_error(drain(&mut rx));
        assert_eq!(code, "DATABASE");
        assert_eq!(message, "Error sending message");
        assert!(drain(&mut owner_rx).is_empty());
        assert!(w.conversations.is_empty().await);
        assert!(w.messages.is_empty().await);
    }

    #[tokio::test]
    async fn test_mark_as_read_notifies_both_sides() {
        let w = world().await;
        let (mut owner, mut owner_rx) = connect(&w.engine, &w.owner);
        let (mut renter, mut renter_rx) = connect(&w.engine, &w.renter);

        renter.handle_text(&send(&w.owner, w.vehicle, "one")).await;
        renter.handle_text(&send(&w.owner, w.vehicle, "two")).await;
        let conversation_id = drain(&mut owner_rx)
            .into_iter()
            .find_map(|e| match e {
                OutboundEvent::NewMessage { conversation_id, .. } => Some(conversation_id),
                _ => None,
            })
            .expect("new message");
        drain(&mut renter_rx);

        owner
            .dispatch(InboundIntent::MarkAsRead(MarkAsReadPayload {
                conversation_id: Some(conversation_id),
            }))
            .await;

        match drain(&mut owner_rx).as_slice() {
            [OutboundEvent::MessagesMarkedRead { conversation_id: id, count }] => {
                assert_eq!(*id, conversation_id);
                assert_eq!(*count, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        match drain(&mut renter_rx).as_slice() {
            [OutboundEvent::MessagesRead { read_by, .. }] => assert_eq!(*read_by, w.owner.id),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mark_as_read_unknown_conversation() {
        let w = world().await;
        let (mut owner, mut rx) = connect(&w.engine, &w.owner);

        owner
            .dispatch(InboundIntent::MarkAsRead(MarkAsReadPayload {
                conversation_id: Some(ConversationId::new()),
            }))
            .await;

        let (code, message) = single_error(drain(&mut rx));
        assert_eq!(code, "NOT_FOUND");
        assert_eq!(message, "Conversation not found");
    }

    #[tokio::test]
    async fn test_typing_indicators_go_to_receiver_only() {
        let w = world().await;
        let (_owner, mut owner_rx) = connect(&w.engine, &w.owner);
        let (mut renter, mut renter_rx) = connect(&w.engine, &w.renter);
        let (_stranger, mut stranger_rx) = connect(&w.engine, &w.stranger);
        let payload = TypingPayload {
            receiver_id: Some(w.owner.id),
            vehicle_id: Some(w.vehicle),
        };

        renter.dispatch(InboundIntent::TypingStart(payload.clone())).await;
        renter.dispatch(InboundIntent::TypingStop(payload)).await;

        match drain(&mut owner_rx).as_slice() {
            [
                OutboundEvent::UserTyping { user_id, user_name, vehicle_id },
                OutboundEvent::UserStoppedTyping { user_id: stopped, .. },
            ] => {
                assert_eq!(*user_id, w.renter.id);
                assert_eq!(user_name, &w.renter.name);
                assert_eq!(*vehicle_id, w.vehicle);
                assert_eq!(*stopped, w.renter.id);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(drain(&mut renter_rx).is_empty());
        assert!(drain(&mut stranger_rx).is_empty());
    }

    #[tokio::test]
    async fn test_typing_to_offline_user_is_silent() {
        let w = world().await;
        let (mut renter, mut rx) = connect(&w.engine, &w.renter);

        renter
            .dispatch(InboundIntent::TypingStart(TypingPayload {
                receiver_id: Some(UserId::new()),
                vehicle_id: Some(w.vehicle),
            }))
            .await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_user_online_broadcasts_to_others() {
        let w = world().await;
        let (mut owner, mut owner_rx) = connect(&w.engine, &w.owner);
        let (_renter, mut renter_rx) = connect(&w.engine, &w.renter);

        owner.handle_text(r#"{"type":"user_online"}"#).await;

        assert!(drain(&mut owner_rx).is_empty());
        match drain(&mut renter_rx).as_slice() {
            [OutboundEvent::UserStatusChange { user_id, status }] => {
                assert_eq!(*user_id, w.owner.id);
                assert_eq!(*status, PresenceStatus::Online);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_offline() {
        let w = world().await;
        let (mut owner, _owner_rx) = connect(&w.engine, &w.owner);
        let (_renter, mut renter_rx) = connect(&w.engine, &w.renter);

        owner.disconnect();
        owner.disconnect();

        assert_eq!(owner.state(), ConnectionState::Disconnected);
        assert!(!w.engine.presence.is_online(w.owner.id));
        match drain(&mut renter_rx).as_slice() {
            [OutboundEvent::UserStatusChange { status, .. }] => {
                assert_eq!(*status, PresenceStatus::Offline)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(w.engine.metrics.snapshot().connections_active, 1);
    }

    #[tokio::test]
    async fn test_superseded_session_leaves_quietly() {
        let w = world().await;
        let (_renter, mut renter_rx) = connect(&w.engine, &w.renter);
        let (mut first, _first_rx) = connect(&w.engine, &w.owner);
        let (second, _second_rx) = connect(&w.engine, &w.owner);

        first.disconnect();

        assert_eq!(w.engine.presence.lookup(w.owner.id), Some(second.session_id()));
        assert!(drain(&mut renter_rx).is_empty());
    }

    #[tokio::test]
    async fn test_messages_are_delivered_to_latest_session() {
        let w = world().await;
        let (_old, mut old_rx) = connect(&w.engine, &w.owner);
        let (_new, mut new_rx) = connect(&w.engine, &w.owner);
        let (mut renter, _renter_rx) = connect(&w.engine, &w.renter);

        renter.handle_text(&send(&w.owner, w.vehicle, "Hi")).await;

        assert!(drain(&mut old_rx).is_empty());
        assert_eq!(drain(&mut new_rx).len(), 2);
    }

    #[tokio::test]
    async fn test_disconnected_session_ignores_intents() {
        let w = world().await;
        let (mut renter, mut rx) = connect(&w.engine, &w.renter);
        renter.disconnect();

        renter.handle_text(&send(&w.owner, w.vehicle, "late")).await;

        assert!(drain(&mut rx).is_empty());
        assert!(w.messages.is_empty().await);
    }
}
