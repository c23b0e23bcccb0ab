//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, error, warn};

use rentchat_realtime::{AuthenticatedSession, ChatEngine};
use rentchat_realtime::message::serializer::serialize_event;

use crate::error::ApiError;
use crate::extractors::bearer_token;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// JWT access token; the Authorization header is used when absent.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrade
    let credential = query.token.as_deref().or_else(|| bearer_token(&headers));
    let session = state.engine.begin_session().authenticate(credential).await?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state.engine, session, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(engine: ChatEngine, session: AuthenticatedSession, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut shutdown = engine.shutdown_receiver();
    let (mut session, mut outbound_rx) = session.activate();
    let conn_id = session.session_id();

    // Spawn outbound event forwarder
    let outbound_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = outbound_rx.recv() => {
                    let Some(event) = event else { break };
                    let text = match serialize_event(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            error!(conn_id = %conn_id, error = %e, "Failed to serialize event");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Process inbound frames one at a time
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => session.handle_text(text.as_str()).await,
            Ok(Message::Binary(data)) => {
                session.handle_text(&String::from_utf8_lossy(&data)).await
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                break;
            }
        }
    }

    // Cleanup
    session.disconnect();
    drop(session);
    if let Err(e) = outbound_task.await {
        warn!(conn_id = %conn_id, error = %e, "Outbound forwarder ended abnormally");
    }
}
