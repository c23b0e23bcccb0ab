//! Process-local store implementations.
//!
//! Used by tests and by `database.provider = "memory"` development runs.
//! Nothing here survives a restart.

pub mod conversation;
pub mod directory;
pub mod message;

pub use conversation::MemoryConversationStore;
pub use directory::MemoryDirectory;
pub use message::MemoryMessageStore;
