//! Fixed-window rate limiting for sensitive actions.

pub mod limiter;

pub use limiter::{RateLimitDecision, RateLimiter};
