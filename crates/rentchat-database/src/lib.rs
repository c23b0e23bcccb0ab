//! # rentchat-database
//!
//! Durable storage for conversations and messages, plus read-only access to
//! the marketplace `users` and `vehicles` tables.
//!
//! Every store is a trait object so the services can run against PostgreSQL
//! ([`repositories`]) or the process-local maps in [`memory`].

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{ConversationStore, MessageStore, UserDirectory, VehicleCatalog};
