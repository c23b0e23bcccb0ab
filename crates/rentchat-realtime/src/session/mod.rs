//! Per-connection session state machine.

pub mod handler;
pub mod pending;
pub mod state;

pub use handler::SessionHandler;
pub use pending::{AuthenticatedSession, PendingSession};
pub use state::ConnectionState;
