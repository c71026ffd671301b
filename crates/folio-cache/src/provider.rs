//! Store manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use folio_core::clock::Clock;
use folio_core::config::CacheConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::traits::{CacheProvider, WindowHit};

/// Store manager wrapping the configured provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Build the provider named in `config`.
    ///
    /// `clock` drives expiry for the in-memory provider; Redis keeps its own
    /// time.
    #[cfg_attr(not(feature = "memory"), allow(unused_variables))]
    pub async fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis store provider");
                let client = crate::redis::RedisClient::connect(config).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(clock))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Wrap an existing provider.
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        self.inner.get_many(keys).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<u64> {
        self.inner.delete_many(keys).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        self.inner.ttl(key).await
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.inner.set_members(key).await
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> AppResult<u64> {
        self.inner.set_remove(key, members).await
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
        self.inner
            .put_indexed(key, value, ttl, index_key, member, index_ttl)
            .await
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
        self.inner
            .renew_indexed(key, value, ttl, index_key, member, index_ttl)
            .await
    }

    async fn take_indexed(
        &self,
        key: &str,
        index_key: &str,
        member: &str,
    ) -> AppResult<Option<String>> {
        self.inner.take_indexed(key, index_key, member).await
    }

    async fn purge_index(&self, index_key: &str, record_prefix: &str) -> AppResult<u64> {
        self.inner.purge_index(index_key, record_prefix).await
    }

    async fn delete_indexed(&self, key: &str, index_key: &str, member: &str) -> AppResult<bool> {
        self.inner.delete_indexed(key, index_key, member).await
    }

    async fn hit_window(&self, key: &str, max: u64, window: Duration) -> AppResult<WindowHit> {
        self.inner.hit_window(key, max, window).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
