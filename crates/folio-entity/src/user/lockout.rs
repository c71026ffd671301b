//! Account lockout policy.

use chrono::{DateTime, Duration, Utc};

/// Locks an account after too many consecutive password failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures that trigger a lock.
    pub threshold: i32,
    /// How long a lock lasts.
    pub duration: Duration,
}

impl LockoutPolicy {
    /// Creates a policy.
    pub fn new(threshold: i32, duration: Duration) -> Self {
        Self {
            threshold,
            duration,
        }
    }

    /// Counter state after one more failure.
    ///
    /// A lock that has already run out restarts the count at 1. Reaching the
    /// threshold sets a fresh lock. Stores must apply this as one atomic
    /// update of the principal record.
    pub fn register_failure(
        &self,
        attempts: i32,
        lock_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> (i32, Option<DateTime<Utc>>) {
        let expired = lock_until.is_some_and(|until| until <= now);
        let (attempts, lock_until) = if expired {
            (1, None)
        } else {
            (attempts + 1, lock_until)
        };

        if attempts >= self.threshold {
            (attempts, Some(now + self.duration))
        } else {
            (attempts, lock_until)
        }
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(5, Duration::minutes(30))
    }
}
