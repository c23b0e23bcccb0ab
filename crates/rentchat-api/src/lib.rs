//! # rentchat-api
//!
//! HTTP API layer for RentChat built on Axum.
//!
//! Serves the WebSocket upgrade for the live chat protocol and the
//! read-only chat queries (inbox, message history, unread total, the
//! conversation shown on a vehicle page), plus a health endpoint.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
