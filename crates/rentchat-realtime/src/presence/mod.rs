//! Process-local presence.

pub mod registry;

pub use registry::{PresenceEntry, PresenceRegistry};
