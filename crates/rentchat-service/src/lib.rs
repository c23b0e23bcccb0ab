//! # rentchat-service
//!
//! Chat use cases for RentChat. Services receive their stores as trait
//! objects at construction time and are shared behind `Arc` by the realtime
//! engine and the HTTP handlers.

pub mod chat;
pub mod context;

pub use chat::{
    AuthorizationPolicy, ChatService, ConversationLocks, ConversationService, MessageService,
    PolicyDecision, ReadReceipt, SendMessageRequest, SentMessage,
};
pub use context::RequestContext;
