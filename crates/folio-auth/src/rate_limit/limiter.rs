//! Atomic fixed-window limiter.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use folio_cache::CacheManager;
use folio_cache::keys;
use folio_core::clock::Clock;
use folio_core::config::RateLimitConfig;
use folio_core::traits::CacheProvider;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    /// Whether the action may proceed.
    pub allowed: bool,
    /// Attempts left in the current window.
    pub remaining: u64,
    /// When the window resets (epoch ms).
    pub reset_at: i64,
    /// Seconds to wait before retrying; only set when refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Throttles actions per `(action, identifier)` pair.
///
/// The read-check-increment runs as one atomic store operation. When the
/// store is unreachable the limiter lets requests through and logs a
/// warning rather than locking everyone out.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Arc<CacheManager>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter.
    pub fn new(cache: Arc<CacheManager>, config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            config,
            clock,
        }
    }

    /// Counts one attempt of `action` by `identifier`.
    pub async fn check(&self, identifier: &str, action: &str) -> RateLimitDecision {
        let now = self.clock.now_millis();

        if !self.config.enabled {
            return unlimited(now);
        }
        let Some(rule) = self.config.rule(action) else {
            warn!(action, "No rate-limit rule for action; allowing");
            return unlimited(now);
        };

        let window = Duration::from_secs(rule.window_seconds);
        let key = keys::rate_limit(action, identifier);

        match self.cache.hit_window(&key, rule.max_attempts, window).await {
            Ok(hit) => {
                let reset_at = now + hit.ttl.as_millis() as i64;
                if hit.allowed {
                    RateLimitDecision {
                        allowed: true,
                        remaining: rule.max_attempts.saturating_sub(hit.count),
                        reset_at,
                        retry_after: None,
                    }
                } else {
                    let retry_after = hit.ttl.as_millis().div_ceil(1000).max(1) as u64;
                    debug!(action, identifier, retry_after, "Rate limit exceeded");
                    RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at,
                        retry_after: Some(retry_after),
                    }
                }
            }
            Err(e) => {
                warn!(
                    action,
                    identifier,
                    error = %e,
                    "Rate limiter store unavailable; failing open"
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: rule.max_attempts,
                    reset_at: now + window.as_millis() as i64,
                    retry_after: None,
                }
            }
        }
    }

    /// Clears the window for `identifier`.
    pub async fn reset(&self, identifier: &str, action: &str) {
        let key = keys::rate_limit(action, identifier);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(action, identifier, error = %e, "Failed to reset rate limit");
        }
    }
}

fn unlimited(now: i64) -> RateLimitDecision {
    RateLimitDecision {
        allowed: true,
        remaining: u64::MAX,
        reset_at: now,
        retry_after: None,
    }
}
