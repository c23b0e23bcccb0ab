//! PostgreSQL implementations of the store traits.

pub mod conversation;
pub mod message;
pub mod user;
pub mod vehicle;

pub use conversation::ConversationRepository;
pub use message::MessageRepository;
pub use user::UserRepository;
pub use vehicle::VehicleRepository;
