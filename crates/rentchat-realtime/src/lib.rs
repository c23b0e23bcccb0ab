//! # rentchat-realtime
//!
//! Live chat engine for RentChat. Provides:
//!
//! - Presence registry mapping users to their live session
//! - Typed inbound intents and outbound events for the chat protocol
//! - Per-connection session state machine with ordered intent dispatch
//! - Credential verification with a bounded window for new connections
//! - Engine metrics
//!
//! The engine is transport-agnostic: the HTTP layer feeds text frames into a
//! [`SessionHandler`] and forwards the events it receives on the paired
//! channel.

pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod server;
pub mod session;

#[cfg(test)]
mod testing;

pub use message::types::{InboundIntent, OutboundEvent, PresenceStatus};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use presence::registry::{PresenceEntry, PresenceRegistry};
pub use server::ChatEngine;
pub use session::handler::SessionHandler;
pub use session::pending::{AuthenticatedSession, PendingSession};
pub use session::state::ConnectionState;
