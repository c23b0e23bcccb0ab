//! Convenience result type alias for RentChat.

use crate::error::AppError;

/// A specialized `Result` type for RentChat operations.
pub type AppResult<T> = Result<T, AppError>;
