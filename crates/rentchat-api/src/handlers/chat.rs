//! Chat query handlers.

use axum::Json;
use axum::extract::{Path, State};

use rentchat_core::types::{ConversationId, UserId, VehicleId};
use rentchat_entity::{ConversationView, MessageView};

use crate::dto::{ApiResponse, UnreadCountResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/chat/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ConversationView>>>, ApiError> {
    let conversations = state.chat.list_conversations(&auth).await?;
    Ok(Json(ApiResponse::ok(conversations)))
}

/// GET /api/chat/conversations/{conversation_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<ConversationId>,
) -> Result<Json<ApiResponse<Vec<MessageView>>>, ApiError> {
    let messages = state.chat.list_messages(&auth, conversation_id).await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// GET /api/chat/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, ApiError> {
    let unread_count = state.chat.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { unread_count })))
}

/// GET /api/chat/conversations/vehicle/{vehicle_id}/user/{user_id}
pub async fn conversation_with_owner(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((vehicle_id, owner_id)): Path<(VehicleId, UserId)>,
) -> Result<Json<ApiResponse<ConversationView>>, ApiError> {
    let view = state
        .chat
        .conversation_with_owner(&auth, vehicle_id, owner_id)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}
