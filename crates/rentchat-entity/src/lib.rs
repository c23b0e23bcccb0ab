//! # rentchat-entity
//!
//! Domain entity models for RentChat. `Conversation` and `Message` are the
//! records this service owns; `UserSummary` and `Vehicle` are read-only
//! projections of marketplace tables. The `view` types are the populated
//! shapes sent to clients over the event protocol and the HTTP surface.

pub mod conversation;
pub mod message;
pub mod user;
pub mod vehicle;

pub use conversation::{Conversation, ConversationView, MessagePreview};
pub use message::{Message, MessageView, NewMessage};
pub use user::UserSummary;
pub use vehicle::{Vehicle, VehicleSummary};
