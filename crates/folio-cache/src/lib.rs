//! # folio-cache
//!
//! Key-value backends for sessions, the per-user session index, and
//! rate-limit buckets. Two providers:
//!
//! - **redis**: shared store for multi-instance deployments, using
//!   `MULTI/EXEC` pipelines and Lua scripts for the atomic operations
//! - **memory**: single-process store with clock-driven expiry, for tests
//!   and local development
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
