//! Shared fixtures for engine tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use rentchat_auth::IdentityVerifier;
use rentchat_core::config::RealtimeConfig;
use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;
use rentchat_core::types::{UserId, VehicleId};
use rentchat_database::UserDirectory;
use rentchat_database::memory::{MemoryConversationStore, MemoryDirectory, MemoryMessageStore};
use rentchat_entity::{UserSummary, Vehicle};
use rentchat_service::ChatService;

use crate::message::types::OutboundEvent;
use crate::server::ChatEngine;
use crate::session::SessionHandler;

/// Accepts a user id as the token and looks it up in the directory.
#[derive(Debug)]
pub(crate) struct DirectoryVerifier(pub Arc<MemoryDirectory>);

#[async_trait]
impl IdentityVerifier for DirectoryVerifier {
    async fn verify(&self, credential: &str) -> AppResult<UserSummary> {
        let id: UserId = credential
            .parse()
            .map_err(|_| AppError::authentication("Invalid token"))?;
        self.0
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::authentication("User not found"))
    }
}

pub(crate) struct World {
    pub engine: ChatEngine,
    pub conversations: Arc<MemoryConversationStore>,
    pub messages: Arc<MemoryMessageStore>,
    pub owner: UserSummary,
    pub renter: UserSummary,
    pub stranger: UserSummary,
    pub vehicle: VehicleId,
}

/// An engine over memory stores with an owner, a renter, a stranger and one
/// vehicle listed by the owner.
pub(crate) async fn world() -> World {
    let directory = Arc::new(MemoryDirectory::new());
    let conversations = Arc::new(MemoryConversationStore::new());
    let messages = Arc::new(MemoryMessageStore::new());

    let owner = UserSummary::new(UserId::new(), "Olivia", None);
    let renter = UserSummary::new(UserId::new(), "Ben", None);
    let stranger = UserSummary::new(UserId::new(), "Carl", None);
    for user in [&owner, &renter, &stranger] {
        directory.insert_user(user.clone()).await;
    }
    let vehicle = VehicleId::new();
    directory
        .insert_vehicle(Vehicle {
            id: vehicle,
            owner_id: owner.id,
            name: "Yamaha NMAX".to_string(),
            image_url: Some("https://img/nmax.png".to_string()),
            category: Some("scooter".to_string()),
        })
        .await;

    let chat = Arc::new(ChatService::new(
        conversations.clone(),
        messages.clone(),
        directory.clone(),
        directory.clone(),
    ));
    let engine = ChatEngine::new(
        RealtimeConfig::default(),
        chat,
        Arc::new(DirectoryVerifier(directory)),
    );

    World {
        engine,
        conversations,
        messages,
        owner,
        renter,
        stranger,
        vehicle,
    }
}

/// Open an active session for `user`, skipping credential checks.
pub(crate) fn connect(
    engine: &ChatEngine,
    user: &UserSummary,
) -> (SessionHandler, mpsc::Receiver<OutboundEvent>) {
    engine.open_session(user.clone())
}

/// Everything queued so far.
pub(crate) fn drain(rx: &mut mpsc::Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
