//! Live connection bookkeeping.

pub mod authenticator;
pub mod handle;
pub mod pool;

pub use authenticator::WsAuthenticator;
pub use handle::ConnectionHandle;
pub use pool::ConnectionPool;
