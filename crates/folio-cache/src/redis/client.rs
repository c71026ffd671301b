//! Redis connection management.

use std::future::Future;
use std::time::Duration;

use redis::Client;
use redis::RedisResult;
use redis::aio::ConnectionManager;
use tracing::{info, warn};

use folio_core::config::CacheConfig;
use folio_core::error::{AppError, ErrorKind};
use folio_core::result::AppResult;

/// Redis client wrapper with connection management.
///
/// Every command issued through [`RedisClient::run`] is bounded by the
/// configured operation timeout so a stalled server surfaces as an error
/// instead of a hung request.
#[derive(Debug, Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    key_prefix: String,
    timeout: Duration,
}

impl RedisClient {
    /// Connect using the cache section of the configuration.
    pub async fn connect(config: &CacheConfig) -> AppResult<Self> {
        info!(url = %mask_redis_url(&config.redis.url), "Connecting to Redis");

        let client = Client::open(config.redis.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to create Redis client", e)
        })?;

        let connect_timeout = Duration::from_secs(config.redis.connect_timeout_seconds);
        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| AppError::cache("Timed out connecting to Redis"))?
            .map_err(|e| AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e))?;

        info!("Successfully connected to Redis");
        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
            timeout: Duration::from_millis(config.operation_timeout_ms),
        })
    }

    /// A handle to the shared connection.
    pub fn conn_mut(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Build a full key with the configured prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    /// Await a Redis command under the operation timeout.
    pub async fn run<T, F>(&self, op: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AppError::with_source(
                ErrorKind::Cache,
                format!("Redis {op} failed: {e}"),
                e,
            )),
            Err(_) => {
                warn!(op, timeout_ms = self.timeout.as_millis() as u64, "Redis command timed out");
                Err(AppError::cache(format!("Redis {op} timed out")))
            }
        }
    }
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|p| p + 3) else {
        return url.to_string();
    };
    match url[scheme_end..].rfind('@') {
        Some(at) => format!("{}****{}", &url[..scheme_end], &url[scheme_end + at..]),
        None => url.to_string(),
    }
}
