//! Conversation entity and its populated view.

pub mod model;
pub mod view;

pub use model::Conversation;
pub use view::{ConversationView, MessagePreview};
