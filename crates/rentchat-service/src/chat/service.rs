//! Chat use cases shared by the live event protocol and the HTTP queries.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{ConversationId, ConversationKey, UserId, VehicleId};
use rentchat_database::{ConversationStore, MessageStore, UserDirectory, VehicleCatalog};
use rentchat_entity::{Conversation, ConversationView, MessagePreview, MessageView, NewMessage};

use super::conversation::ConversationService;
use super::locks::ConversationLocks;
use super::message::MessageService;
use super::policy::AuthorizationPolicy;
use crate::context::RequestContext;

/// A message the caller wants to send.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    /// Addressee.
    pub receiver_id: UserId,
    /// Vehicle the message is about.
    pub vehicle_id: VehicleId,
    /// Text body.
    pub content: String,
    /// Optional type tag; `"text"` when absent.
    #[serde(default)]
    pub message_type: Option<String>,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// The stored message, populated.
    pub message: MessageView,
    /// The conversation after the message was recorded.
    pub conversation: ConversationView,
    /// Id of that conversation.
    pub conversation_id: ConversationId,
    /// Whether this message created the conversation.
    pub created_conversation: bool,
}

/// Result of a successful mark-as-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    /// The conversation that was read.
    pub conversation_id: ConversationId,
    /// Who read it.
    pub reader: UserId,
    /// The other participant, whose messages were marked.
    pub other: UserId,
    /// How many messages flipped to read.
    pub count: u64,
}

/// Facade over policy, stores and locks.
#[derive(Debug, Clone)]
pub struct ChatService {
    policy: AuthorizationPolicy,
    conversations: ConversationService,
    messages: MessageService,
    users: Arc<dyn UserDirectory>,
    locks: Arc<ConversationLocks>,
}

impl ChatService {
    /// Wire the chat service over its stores.
    pub fn new(
        conversation_store: Arc<dyn ConversationStore>,
        message_store: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
        vehicles: Arc<dyn VehicleCatalog>,
    ) -> Self {
        Self {
            policy: AuthorizationPolicy::new(vehicles.clone(), conversation_store.clone()),
            conversations: ConversationService::new(
                conversation_store,
                message_store.clone(),
                users.clone(),
                vehicles,
            ),
            messages: MessageService::new(message_store, users.clone()),
            users,
            locks: Arc::new(ConversationLocks::new()),
        }
    }

    /// Conversation operations.
    pub fn conversations(&self) -> &ConversationService {
        &self.conversations
    }

    /// Message operations.
    pub fn messages(&self) -> &MessageService {
        &self.messages
    }

    /// Validate, authorize and persist a message, then update its
    /// conversation.
    ///
    /// Steps for one (pair, vehicle) key run under a single-writer lock so
    /// concurrent sends cannot lose unread increments and `created_at` is
    /// strictly increasing within the conversation. The message is stored
    /// before the conversation is touched; if the conversation update fails
    /// the message is removed again, so a failed send leaves both stores as
    /// they were.
    pub async fn send_message(
        &self,
        ctx: &RequestContext,
        req: SendMessageRequest,
    ) -> AppResult<SentMessage> {
        let sender = ctx.user_id();
        let new = NewMessage::new(
            sender,
            req.receiver_id,
            req.vehicle_id,
            &req.content,
            req.message_type.as_deref(),
        )?;

        let vehicle = self
            .policy
            .can_message(sender, req.receiver_id, req.vehicle_id)
            .await?
            .into_result()?;

        let receiver = self
            .users
            .find_user(req.receiver_id)
            .await?
            .ok_or_else(|| AppError::not_found("Receiver not found"))?;

        let key = ConversationKey::new(sender, req.receiver_id, req.vehicle_id)?;
        let (conversation, message, created_conversation) = {
            let _guard = self.locks.acquire(key).await;
            let now = Utc::now().trunc_subsecs(6);
            let previous = self.conversations.find_by_key(&key).await?;
            let created_at = next_created_at(previous.as_ref(), now);
            let message = self.messages.append(new, created_at).await?;
            let conversation = match self.conversations.record_message(&key, &message).await {
                Ok(conversation) => conversation,
                Err(e) => {
                    self.messages.discard(&message).await;
                    return Err(e);
                }
            };
            (conversation, message, previous.is_none())
        };

        info!(
            conversation_id = %conversation.id,
            message_id = %message.id,
            sender_id = %sender,
            receiver_id = %receiver.id,
            "Message sent"
        );

        let participants = conversation
            .participants
            .as_array()
            .map(|id| if id == sender { ctx.user.clone() } else { receiver.clone() })
            .to_vec();
        let view = ConversationView::from_conversation(
            &conversation,
            participants,
            vehicle.summary(),
            Some(MessagePreview::from(&message)),
        );

        Ok(SentMessage {
            message: MessageView::new(message, ctx.user.clone(), receiver),
            conversation_id: conversation.id,
            conversation: view,
            created_conversation,
        })
    }

    /// Mark every message addressed to the caller in `conversation_id` as
    /// read and reset the caller's unread counter. Idempotent.
    pub async fn mark_as_read(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> AppResult<ReadReceipt> {
        let reader = ctx.user_id();
        let conversation = self
            .conversations
            .get_for_participant(conversation_id, reader)
            .await?;
        let other = conversation
            .participants
            .other(reader)
            .ok_or_else(|| AppError::not_found("Conversation not found"))?;

        let count = {
            let _guard = self.locks.acquire(conversation.key()).await;
            let count = self
                .messages
                .mark_all_read_for_receiver(reader, other, conversation.vehicle_id)
                .await?;
            self.conversations.mark_read(conversation.id, reader).await?;
            count
        };

        debug!(
            conversation_id = %conversation.id,
            user_id = %reader,
            count,
            "Conversation marked read"
        );

        Ok(ReadReceipt {
            conversation_id: conversation.id,
            reader,
            other,
            count,
        })
    }

    /// The caller's inbox.
    pub async fn list_conversations(&self, ctx: &RequestContext) -> AppResult<Vec<ConversationView>> {
        self.conversations.list_for_user(ctx.user_id()).await
    }

    /// Messages of a conversation the caller participates in, oldest first.
    pub async fn list_messages(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> AppResult<Vec<MessageView>> {
        let conversation = self
            .conversations
            .get_for_participant(conversation_id, ctx.user_id())
            .await?;
        self.messages.list_for_conversation(&conversation).await
    }

    /// Total unread messages addressed to the caller.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.conversations.total_unread(ctx.user_id()).await
    }

    /// The caller's conversation with the owner of `vehicle_id`, or a
    /// placeholder.
    pub async fn conversation_with_owner(
        &self,
        ctx: &RequestContext,
        vehicle_id: VehicleId,
        owner_id: UserId,
    ) -> AppResult<ConversationView> {
        self.conversations
            .find_with_owner(&ctx.user, vehicle_id, owner_id)
            .await
    }
}

/// Creation time for the next message of `conversation`: now, but never
/// at or before its previous message.
fn next_created_at(conversation: Option<&Conversation>, now: DateTime<Utc>) -> DateTime<Utc> {
    match conversation {
        Some(c) if c.last_message_id.is_some() => {
            now.max(c.last_message_at + Duration::microseconds(1))
        }
        _ => now,
    }
}
