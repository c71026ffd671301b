//! Redis store provider implementation.
//!
//! Single-key operations map onto plain commands. The multi-key operations
//! the session store and rate limiter rely on for atomicity run either as a
//! `MULTI/EXEC` pipeline or as a Lua script, so Redis applies them as one
//! unit.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use redis::Script;
use tracing::debug;

use folio_core::result::AppResult;
use folio_core::traits::{CacheProvider, WindowHit};

use super::client::RedisClient;

/// Read a record, delete it, and drop it from its index set.
///
/// KEYS[1] = record key
/// KEYS[2] = index set key
/// ARGV[1] = index member
static TAKE_INDEXED: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local value = redis.call('GET', KEYS[1])
        if value then
            redis.call('DEL', KEYS[1])
        end
        redis.call('SREM', KEYS[2], ARGV[1])
        return value
    "#,
    )
});

/// Delete a record and drop it from its index set.
///
/// Returns the number of records deleted (0 or 1).
static DELETE_INDEXED: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local removed = redis.call('DEL', KEYS[1])
        redis.call('SREM', KEYS[2], ARGV[1])
        return removed
    "#,
    )
});

/// Rewrite a record only while it exists, and refresh its index entry.
///
/// KEYS[1] = record key
/// KEYS[2] = index set key
/// ARGV[1] = new value
/// ARGV[2] = record TTL in milliseconds
/// ARGV[3] = index member
/// ARGV[4] = index TTL in milliseconds
///
/// Returns 1 if the record was rewritten, 0 if it was already gone.
static RENEW_INDEXED: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        if not redis.call('SET', KEYS[1], ARGV[1], 'XX', 'PX', ARGV[2]) then
            return 0
        end
        redis.call('SADD', KEYS[2], ARGV[3])
        redis.call('PEXPIRE', KEYS[2], ARGV[4])
        return 1
    "#,
    )
});

/// Delete every record an index set names, then the set.
///
/// KEYS[1] = index set key
/// ARGV[1] = record key prefix (already carrying the global prefix)
///
/// Record keys are derived from the members, so this relies on a single
/// Redis node rather than cluster slot routing.
static PURGE_INDEX: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local members = redis.call('SMEMBERS', KEYS[1])
        local removed = 0
        for _, member in ipairs(members) do
            removed = removed + redis.call('DEL', ARGV[1] .. member)
        end
        redis.call('DEL', KEYS[1])
        return removed
    "#,
    )
});

/// Fixed-window counter hit.
///
/// KEYS[1] = counter key
/// ARGV[1] = max hits per window
/// ARGV[2] = window length in milliseconds
///
/// Returns `{allowed, count, pttl}`. The window starts at the first counted
/// hit; a counter that lost its expiry gets it back on the next hit.
static HIT_WINDOW: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local max = tonumber(ARGV[1])
        local window = tonumber(ARGV[2])
        local count = tonumber(redis.call('GET', KEYS[1]) or '0')

        local allowed = 0
        if count < max then
            count = redis.call('INCR', KEYS[1])
            if count == 1 then
                redis.call('PEXPIRE', KEYS[1], window)
            end
            allowed = 1
        end

        local ttl = redis.call('PTTL', KEYS[1])
        if ttl < 0 then
            redis.call('PEXPIRE', KEYS[1], window)
            ttl = window
        end
        return {allowed, count, ttl}
    "#,
    )
});

/// Redis-backed store provider.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    /// Create a new Redis provider.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

/// Milliseconds for `PX`/`PEXPIRE`; never zero, which Redis rejects.
fn millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("GET").arg(self.client.prefixed_key(key)).clone();
        self.client.run("GET", cmd.query_async(&mut conn)).await
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let full_keys: Vec<String> = keys.iter().map(|k| self.client.prefixed_key(k)).collect();
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("MGET").arg(&full_keys).clone();
        self.client.run("MGET", cmd.query_async(&mut conn)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("SET")
            .arg(self.client.prefixed_key(key))
            .arg(value)
            .arg("PX")
            .arg(millis(ttl))
            .clone();
        let _: () = self.client.run("SET", cmd.query_async(&mut conn)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("DEL").arg(self.client.prefixed_key(key)).clone();
        let _: u64 = self.client.run("DEL", cmd.query_async(&mut conn)).await?;
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let full_keys: Vec<String> = keys.iter().map(|k| self.client.prefixed_key(k)).collect();
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("DEL").arg(&full_keys).clone();
        let removed: u64 = self.client.run("DEL", cmd.query_async(&mut conn)).await?;
        debug!(requested = keys.len(), removed, "Deleted keys");
        Ok(removed)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("PEXPIRE")
            .arg(self.client.prefixed_key(key))
            .arg(millis(ttl))
            .clone();
        self.client.run("PEXPIRE", cmd.query_async(&mut conn)).await
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("PTTL").arg(self.client.prefixed_key(key)).clone();
        let pttl: i64 = self.client.run("PTTL", cmd.query_async(&mut conn)).await?;
        // -2: missing key, -1: no expiry.
        Ok((pttl >= 0).then(|| Duration::from_millis(pttl as u64)))
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("SMEMBERS").arg(self.client.prefixed_key(key)).clone();
        self.client.run("SMEMBERS", cmd.query_async(&mut conn)).await
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> AppResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("SREM")
            .arg(self.client.prefixed_key(key))
            .arg(members)
            .clone();
        self.client.run("SREM", cmd.query_async(&mut conn)).await
    }

    async fn put_indexed(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        index_key: &str,
        member: &str,
        index_ttl: Duration,
    ) -> AppResult<()> {
        let full_index = self.client.prefixed_key(index_key);
        let mut conn = self.client.conn_mut();
        let pipe = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(self.client.prefixed_key(key))
            .arg(value)
            .arg("PX")
            .arg(millis(ttl))
            .ignore()
            .cmd("SADD")
            .arg(&full_index)
            .arg(member)
            .ignore()
            .cmd("PEXPIRE")
            .arg(&full_index)
            .arg(millis(index_ttl))
            .ignore()
            .clone();
        let _: () = self
            .client
            .run("MULTI put_indexed", pipe.query_async(&mut conn))
            .await?;
        Ok(())
    }

    async fn renew_indexed(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        index_key: &str,
        member: &str,
        index_ttl: Duration,
    ) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let mut invocation = RENEW_INDEXED.prepare_invoke();
        invocation
            .key(self.client.prefixed_key(key))
            .key(self.client.prefixed_key(index_key))
            .arg(value)
            .arg(millis(ttl))
            .arg(member)
            .arg(millis(index_ttl));
        let renewed: i64 = self
            .client
            .run("EVALSHA renew_indexed", invocation.invoke_async(&mut conn))
            .await?;
        Ok(renewed == 1)
    }

    async fn take_indexed(
        &self,
        key: &str,
        index_key: &str,
        member: &str,
    ) -> AppResult<Option<String>> {
        let mut conn = self.client.conn_mut();
        let mut invocation = TAKE_INDEXED.prepare_invoke();
        invocation
            .key(self.client.prefixed_key(key))
            .key(self.client.prefixed_key(index_key))
            .arg(member);
        self.client
            .run("EVALSHA take_indexed", invocation.invoke_async(&mut conn))
            .await
    }

    async fn delete_indexed(&self, key: &str, index_key: &str, member: &str) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let mut invocation = DELETE_INDEXED.prepare_invoke();
        invocation
            .key(self.client.prefixed_key(key))
            .key(self.client.prefixed_key(index_key))
            .arg(member);
        let removed: i64 = self
            .client
            .run("EVALSHA delete_indexed", invocation.invoke_async(&mut conn))
            .await?;
        Ok(removed > 0)
    }

    async fn purge_index(&self, index_key: &str, record_prefix: &str) -> AppResult<u64> {
        let mut conn = self.client.conn_mut();
        let mut invocation = PURGE_INDEX.prepare_invoke();
        invocation
            .key(self.client.prefixed_key(index_key))
            .arg(self.client.prefixed_key(record_prefix));
        let removed: i64 = self
            .client
            .run("EVALSHA purge_index", invocation.invoke_async(&mut conn))
            .await?;
        Ok(removed.max(0) as u64)
    }

    async fn hit_window(&self, key: &str, max: u64, window: Duration) -> AppResult<WindowHit> {
        let mut conn = self.client.conn_mut();
        let mut invocation = HIT_WINDOW.prepare_invoke();
        invocation
            .key(self.client.prefixed_key(key))
            .arg(max)
            .arg(millis(window));
        let (allowed, count, ttl_ms): (i64, i64, i64) = self
            .client
            .run("EVALSHA hit_window", invocation.invoke_async(&mut conn))
            .await?;

        Ok(WindowHit {
            allowed: allowed == 1,
            count: count.max(0) as u64,
            ttl: Duration::from_millis(ttl_ms.max(0) as u64),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("PING");
        let pong: String = self.client.run("PING", cmd.query_async(&mut conn)).await?;
        Ok(pong == "PONG")
    }
}
