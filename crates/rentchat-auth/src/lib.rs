//! # rentchat-auth
//!
//! Resolves the bearer credential presented by a client to a marketplace
//! user. Tokens are issued elsewhere; this crate only validates them.

pub mod identity;
pub mod jwt;

pub use identity::{IdentityVerifier, JwtIdentityVerifier};
pub use jwt::{Claims, JwtDecoder};
