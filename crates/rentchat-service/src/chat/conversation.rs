//! Conversation lifecycle and inbox views.

use std::sync::Arc;

use tracing::debug;

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{ConversationId, ConversationKey, UserId, VehicleId};
use rentchat_database::{ConversationStore, MessageStore, UserDirectory, VehicleCatalog};
use rentchat_entity::{Conversation, ConversationView, Message, MessagePreview, UserSummary};

/// Conversation store operations plus population of client views.
#[derive(Debug, Clone)]
pub struct ConversationService {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
    vehicles: Arc<dyn VehicleCatalog>,
}

impl ConversationService {
    /// Create a conversation service.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
        vehicles: Arc<dyn VehicleCatalog>,
    ) -> Self {
        Self {
            conversations,
            messages,
            users,
            vehicles,
        }
    }

    /// The conversation for `key`, if one was ever persisted.
    pub async fn find_by_key(&self, key: &ConversationKey) -> AppResult<Option<Conversation>> {
        self.conversations.find_by_key(key).await
    }

    /// Point the conversation for `key` at `message` and bump its receiver's
    /// counter, creating the conversation on its first message.
    pub async fn record_message(
        &self,
        key: &ConversationKey,
        message: &Message,
    ) -> AppResult<Conversation> {
        self.conversations.record_message(key, message).await
    }

    /// Reset the unread counter of `user_id`.
    pub async fn mark_read(&self, id: ConversationId, user_id: UserId) -> AppResult<Conversation> {
        self.conversations.mark_read(id, user_id).await
    }

    /// Load a conversation `user_id` participates in.
    ///
    /// An unknown id and a conversation of other users look the same.
    pub async fn get_for_participant(
        &self,
        id: ConversationId,
        user_id: UserId,
    ) -> AppResult<Conversation> {
        match self.conversations.find_by_id(id).await? {
            Some(conversation) if conversation.has_participant(user_id) => Ok(conversation),
            _ => Err(AppError::not_found("Conversation not found")),
        }
    }

    /// The inbox of `user_id`, newest activity first.
    ///
    /// Conversations whose participants or vehicle no longer resolve are
    /// skipped.
    pub async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<ConversationView>> {
        let conversations = self.conversations.list_for_user(user_id).await?;
        let mut views = Vec::with_capacity(conversations.len());
        for conversation in &conversations {
            match self.populate(conversation).await? {
                Some(view) => views.push(view),
                None => debug!(
                    conversation_id = %conversation.id,
                    "Skipping conversation with unresolved participant or vehicle"
                ),
            }
        }
        Ok(views)
    }

    /// Sum of unread messages addressed to `user_id`.
    pub async fn total_unread(&self, user_id: UserId) -> AppResult<u64> {
        self.conversations.total_unread(user_id).await
    }

    /// The conversation between `caller` and the owner `owner_id` of
    /// `vehicle_id`, or an unpersisted placeholder when they never talked.
    pub async fn find_with_owner(
        &self,
        caller: &UserSummary,
        vehicle_id: VehicleId,
        owner_id: UserId,
    ) -> AppResult<ConversationView> {
        let vehicle = self
            .vehicles
            .find_vehicle(vehicle_id)
            .await?
            .filter(|v| v.is_owned_by(owner_id))
            .ok_or_else(|| AppError::not_found("Vehicle not found or user is not the owner"))?;

        let key = ConversationKey::new(caller.id, owner_id, vehicle_id)?;
        let owner = self
            .users
            .find_user(owner_id)
            .await?
            .unwrap_or_else(|| UserSummary::unknown(owner_id));

        let Some(conversation) = self.conversations.find_by_key(&key).await? else {
            return Ok(ConversationView::placeholder(
                vec![caller.clone(), owner],
                vehicle.summary(),
            ));
        };

        let participants = conversation
            .participants
            .as_array()
            .map(|id| if id == caller.id { caller.clone() } else { owner.clone() })
            .to_vec();
        let preview = self.preview(&conversation).await?;
        Ok(ConversationView::from_conversation(
            &conversation,
            participants,
            vehicle.summary(),
            preview,
        ))
    }

    /// Build the client view of `conversation`.
    ///
    /// Returns `None` when a participant or the vehicle cannot be resolved.
    pub async fn populate(
        &self,
        conversation: &Conversation,
    ) -> AppResult<Option<ConversationView>> {
        let mut participants = Vec::with_capacity(2);
        for id in conversation.participants.as_array() {
            match self.users.find_user(id).await? {
                Some(user) => participants.push(user),
                None => return Ok(None),
            }
        }

        let Some(vehicle) = self.vehicles.find_vehicle(conversation.vehicle_id).await? else {
            return Ok(None);
        };

        let preview = self.preview(conversation).await?;
        Ok(Some(ConversationView::from_conversation(
            conversation,
            participants,
            vehicle.summary(),
            preview,
        )))
    }

    async fn preview(&self, conversation: &Conversation) -> AppResult<Option<MessagePreview>> {
        let Some(id) = conversation.last_message_id else {
            return Ok(None);
        };
        Ok(self
            .messages
            .find_by_id(id)
            .await?
            .as_ref()
            .map(MessagePreview::from))
    }
}
