//! User projection.

pub mod model;

pub use model::UserSummary;
