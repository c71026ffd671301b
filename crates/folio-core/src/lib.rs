//! # folio-core
//!
//! Core crate for the Folio auth core. Contains the configuration schema,
//! the store trait shared by the Redis and in-memory backends, the clock
//! abstraction, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Folio crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AppError;
pub use result::AppResult;
