//! Data transfer objects for the HTTP surface.

pub mod response;

pub use response::{ApiResponse, HealthResponse, UnreadCountResponse};
