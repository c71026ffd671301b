//! Shared fixtures for the auth unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use folio_cache::CacheManager;
use folio_cache::memory::MemoryCacheProvider;
use folio_core::AppError;
use folio_core::clock::Clock;
use folio_core::result::AppResult;
use folio_core::traits::{CacheProvider, WindowHit};
use folio_entity::user::{Principal, UserRole};

/// A store that is always down.
#[derive(Debug)]
pub(crate) struct FailingProvider;

fn down<T>() -> AppResult<T> {
    Err(AppError::cache("connection refused"))
}

#[async_trait]
impl CacheProvider for FailingProvider {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        down()
    }

    async fn get_many(&self, _keys: &[String]) -> AppResult<Vec<Option<String>>> {
        down()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        down()
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        down()
    }

    async fn delete_many(&self, _keys: &[String]) -> AppResult<u64> {
        down()
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<bool> {
        down()
    }

    async fn ttl(&self, _key: &str) -> AppResult<Option<Duration>> {
        down()
    }

    async fn set_members(&self, _key: &str) -> AppResult<Vec<String>> {
        down()
    }

    async fn set_remove(&self, _key: &str, _members: &[String]) -> AppResult<u64> {
        down()
    }

    async fn put_indexed(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
        _index_key: &str,
        _member: &str,
        _index_ttl: Duration,
    ) -> AppResult<()> {
        down()
    }

    async fn renew_indexed(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
        _index_key: &str,
        _member: &str,
        _index_ttl: Duration,
    ) -> AppResult<bool> {
        down()
    }

    async fn take_indexed(
        &self,
        _key: &str,
        _index_key: &str,
        _member: &str,
    ) -> AppResult<Option<String>> {
        down()
    }

    async fn purge_index(&self, _index_key: &str, _record_prefix: &str) -> AppResult<u64> {
        down()
    }

    async fn delete_indexed(&self, _key: &str, _index_key: &str, _member: &str) -> AppResult<bool> {
        down()
    }

    async fn hit_window(&self, _key: &str, _max: u64, _window: Duration) -> AppResult<WindowHit> {
        down()
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

/// A write another request performs concurrently.
#[derive(Debug, Clone)]
pub(crate) enum Interleave {
    /// Revoke one session.
    Delete {
        key: String,
        index_key: String,
        member: String,
    },
    /// Store one indexed session.
    Put {
        key: String,
        value: String,
        index_key: String,
        member: String,
    },
}

/// Memory store that can slip a foreign write in right after a read of a
/// chosen key, and can be told to refuse session writes.
#[derive(Debug)]
pub(crate) struct InterleavingProvider {
    inner: MemoryCacheProvider,
    pending: Mutex<Option<(String, Interleave)>>,
    fail_puts: AtomicBool,
}

impl InterleavingProvider {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: MemoryCacheProvider::new(clock),
            pending: Mutex::new(None),
            fail_puts: AtomicBool::new(false),
        }
    }

    /// Runs `write` once, after the next `get`, `set_members` or
    /// `purge_index` on `key` has completed.
    pub(crate) fn after_read_of(&self, key: &str, write: Interleave) {
        *self.pending.lock().unwrap() = Some((key.to_string(), write));
    }

    pub(crate) fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    async fn fire(&self, key: &str) {
        let write = {
            let mut pending = self.pending.lock().unwrap();
            match pending.as_ref() {
                Some((trigger, _)) if trigger == key => pending.take().map(|(_, w)| w),
                _ => None,
            }
        };
        match write {
            Some(Interleave::Delete {
                key,
                index_key,
                member,
            }) => {
                self.inner
                    .delete_indexed(&key, &index_key, &member)
                    .await
                    .unwrap();
            }
            Some(Interleave::Put {
                key,
                value,
                index_key,
                member,
            }) => {
                self.inner
                    .put_indexed(
                        &key,
                        &value,
                        Duration::from_secs(3_600),
                        &index_key,
                        &member,
                        Duration::from_secs(7_200),
                    )
                    .await
                    .unwrap();
            }
            None => {}
        }
    }
}

#[async_trait]
impl CacheProvider for InterleavingProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value = self.inner.get(key).await;
        self.fire(key).await;
        value
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
        let members = self.inner.set_members(key).await;
        self.fire(key).await;
        members
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
        if self.fail_puts.load(Ordering::SeqCst) {
            return down();
        }
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
        let removed = self.inner.purge_index(index_key, record_prefix).await;
        self.fire(index_key).await;
        removed
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

/// In-memory cache driven by `clock`.
pub(crate) fn memory_cache(clock: Arc<dyn Clock>) -> Arc<CacheManager> {
    Arc::new(CacheManager::from_provider(Arc::new(
        MemoryCacheProvider::new(clock),
    )))
}

/// A fresh editor principal with no stored password.
pub(crate) fn principal() -> Principal {
    let now = Utc::now();
    Principal {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        password_hash: String::new(),
        role: UserRole::Editor,
        failed_login_attempts: 0,
        lock_until: None,
        last_login: None,
        created_at: now,
        updated_at: now,
    }
}

/// Argon2 with the smallest legal cost.
pub(crate) fn cheap_hasher() -> crate::password::PasswordHasher {
    let config = folio_core::config::PasswordHashConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    crate::password::PasswordHasher::new(&config).unwrap()
}
