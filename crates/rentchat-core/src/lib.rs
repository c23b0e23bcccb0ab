//! # rentchat-core
//!
//! Core crate for RentChat, the renter/owner chat backend of the vehicle
//! rental marketplace. Contains configuration schemas, typed identifiers,
//! the normalized conversation key, the unread counter map, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other RentChat crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
