//! Wire types of the chat event protocol.

pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{InboundIntent, OutboundEvent, PresenceStatus};
