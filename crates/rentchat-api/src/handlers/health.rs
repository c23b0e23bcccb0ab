//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (status, database) = match state.conversations.ping().await {
        Ok(()) => ("ok", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: store unavailable");
            ("degraded", "unavailable")
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: database.to_string(),
        online_users: state.engine.presence.online_count(),
        realtime: state.engine.metrics.snapshot(),
    }))
}
