//! Vehicle projection.

pub mod model;

pub use model::{Vehicle, VehicleSummary};
