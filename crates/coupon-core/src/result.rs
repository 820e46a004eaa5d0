//! Convenience result type alias for CouponHub.

use crate::error::AppError;

/// A specialized `Result` type for CouponHub operations.
pub type AppResult<T> = Result<T, AppError>;
