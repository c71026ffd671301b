//! Core traits defined in `folio-core` and implemented by other crates.

pub mod cache;

pub use cache::{CacheProvider, WindowHit};
