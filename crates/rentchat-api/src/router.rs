//! Route definitions for the RentChat HTTP API.
//!
//! Chat queries are mounted under `/api/chat`, the live protocol at `/ws`.

use axum::Router;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/chat", chat_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .with_state(state)
}

/// Chat queries: inbox, history, unread total, vehicle page thread
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(handlers::chat::list_conversations))
        .route(
            "/conversations/{conversation_id}/messages",
            get(handlers::chat::list_messages),
        )
        .route("/unread-count", get(handlers::chat::unread_count))
        .route(
            "/conversations/vehicle/{vehicle_id}/user/{user_id}",
            get(handlers::chat::conversation_with_owner),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
