//! Convenience result type alias for Folio.

use crate::error::AppError;

/// A specialized `Result` type for Folio operations.
pub type AppResult<T> = Result<T, AppError>;
