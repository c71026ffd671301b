//! Cache provider trait for the session and rate-limit backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Outcome of one atomic fixed-window counter hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Whether the hit was counted (the window was still under its limit).
    pub allowed: bool,
    /// Counter value after this hit.
    pub count: u64,
    /// Time until the window resets.
    pub ttl: Duration,
}

/// Trait for key-value backends (Redis or in-memory).
///
/// All values are strings (JSON for structured records). The provider is
/// responsible for key prefixing, TTL enforcement, and bounding every call
/// with its configured timeout. Multi-key operations documented as atomic
/// must be applied all-or-nothing.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Get several values at once, in key order.
    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Delete several keys in one command. Returns how many existed.
    async fn delete_many(&self, keys: &[String]) -> AppResult<u64>;

    /// Set the TTL on an existing key.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Remaining TTL of a key, `None` if the key is missing or has no expiry.
    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>>;

    /// Members of a set.
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Remove members from a set. Returns how many were removed.
    async fn set_remove(&self, key: &str, members: &[String]) -> AppResult<u64>;

    /// Atomically write a record and register it in an index set.
    ///
    /// Stores `value` under `key` with `ttl`, adds `member` to the set at
    /// `index_key`, and sets the index's TTL to `index_ttl`.
    async fn put_indexed(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        index_key: &str,
        member: &str,
        index_ttl: Duration,
    ) -> AppResult<()>;

    /// Atomically rewrite a record only if it still exists.
    ///
    /// When `key` is present, replaces its value and TTL, re-adds `member`
    /// to `index_key` and sets the index TTL to `index_ttl`, all as one
    /// unit. When `key` is gone nothing is written. Returns whether the
    /// record was rewritten.
    async fn renew_indexed(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        index_key: &str,
        member: &str,
        index_ttl: Duration,
    ) -> AppResult<bool>;

    /// Atomically read and delete a record and drop it from an index set.
    ///
    /// Only one caller can ever observe `Some` for a given record.
    async fn take_indexed(
        &self,
        key: &str,
        index_key: &str,
        member: &str,
    ) -> AppResult<Option<String>>;

    /// Atomically delete a record and drop it from an index set.
    ///
    /// Returns whether the record existed.
    async fn delete_indexed(&self, key: &str, index_key: &str, member: &str) -> AppResult<bool>;

    /// Atomically delete every record an index set names, and the set.
    ///
    /// Each member `m` names the record at `record_prefix` + `m`. Returns how
    /// many records existed. A member added after this call is untouched.
    async fn purge_index(&self, index_key: &str, record_prefix: &str) -> AppResult<u64>;

    /// Atomic fixed-window counter.
    ///
    /// If the counter at `key` is already at or above `max`, the hit is
    /// refused and the remaining window reported. Otherwise the counter is
    /// incremented; the window TTL is set only when the increment created it.
    async fn hit_window(&self, key: &str, max: u64, window: Duration) -> AppResult<WindowHit>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
