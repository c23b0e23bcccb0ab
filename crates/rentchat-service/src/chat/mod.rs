//! Chat services.

pub mod conversation;
pub mod locks;
pub mod message;
pub mod policy;
pub mod service;

pub use conversation::ConversationService;
pub use locks::ConversationLocks;
pub use message::MessageService;
pub use policy::{AuthorizationPolicy, DenialReason, Grant, PolicyDecision};
pub use service::{ChatService, ReadReceipt, SendMessageRequest, SentMessage};
