//! Single-process store with per-entry expiry.
//!
//! Expiry is read from the injected [`Clock`], so tests can move time
//! forward without sleeping. Every operation runs under one lock, which
//! makes the multi-key operations atomic within the process.
//!
//! This is a plain map rather than a `moka` cache: moka expires entries on
//! its own wall clock and holds opaque values, while this provider needs
//! clock-driven expiry, set values for the session index, and several keys
//! changed under a single lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use folio_core::clock::Clock;
use folio_core::result::AppResult;
use folio_core::traits::{CacheProvider, WindowHit};
use folio_core::AppError;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at_ms: Option<i64>,
}

impl Entry {
    fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms.is_some_and(|at| at <= now_ms)
    }
}

#[derive(Debug, Default)]
struct Keyspace {
    entries: HashMap<String, Entry>,
}

impl Keyspace {
    /// Live entry for `key`, dropping it first if it has expired.
    fn live(&mut self, key: &str, now_ms: i64) -> Option<&mut Entry> {
        if self.entries.get(key).is_some_and(|e| e.is_expired(now_ms)) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn text(&mut self, key: &str, now_ms: i64) -> AppResult<Option<String>> {
        match self.live(key, now_ms) {
            None => Ok(None),
            Some(Entry {
                value: Value::Text(text),
                ..
            }) => Ok(Some(text.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    fn set_mut(&mut self, key: &str, now_ms: i64) -> AppResult<Option<&mut HashSet<String>>> {
        match self.live(key, now_ms) {
            None => Ok(None),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => Ok(Some(set)),
            Some(_) => Err(wrong_type(key)),
        }
    }

    fn remove_member(&mut self, key: &str, member: &str, now_ms: i64) -> AppResult<bool> {
        let Some(set) = self.set_mut(key, now_ms)? else {
            return Ok(false);
        };
        let removed = set.remove(member);
        if set.is_empty() {
            self.entries.remove(key);
        }
        Ok(removed)
    }
}

fn wrong_type(key: &str) -> AppError {
    AppError::cache(format!("Key '{key}' holds a value of the wrong type"))
}

fn deadline(now_ms: i64, ttl: Duration) -> i64 {
    now_ms + (ttl.as_millis() as i64).max(1)
}

/// In-memory store provider.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    keyspace: Arc<Mutex<Keyspace>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheProvider {
    /// Create an empty store driven by `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            keyspace: Arc::new(Mutex::new(Keyspace::default())),
            clock,
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = self.clock.now_millis();
        self.keyspace.lock().await.text(key, now)
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        // MGET semantics: non-string values read as missing.
        Ok(keys
            .iter()
            .map(|key| space.text(key, now).ok().flatten())
            .collect())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let now = self.clock.now_millis();
        self.keyspace.lock().await.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at_ms: Some(deadline(now, ttl)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.keyspace.lock().await.entries.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<u64> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        let mut removed = 0;
        for key in keys {
            if space.live(key, now).is_some() {
                space.entries.remove(key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        match space.live(key, now) {
            Some(entry) => {
                entry.expires_at_ms = Some(deadline(now, ttl));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        Ok(space
            .live(key, now)
            .and_then(|entry| entry.expires_at_ms)
            .map(|at| Duration::from_millis((at - now).max(0) as u64)))
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        Ok(space
            .set_mut(key, now)?
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> AppResult<u64> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        let mut removed = 0;
        for member in members {
            if space.remove_member(key, member, now)? {
                removed += 1;
            }
        }
        Ok(removed)
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
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;

        // Validate the index type before writing anything.
        let mut members = match space.live(index_key, now) {
            None => HashSet::new(),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => std::mem::take(set),
            Some(_) => return Err(wrong_type(index_key)),
        };
        members.insert(member.to_string());

        space.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at_ms: Some(deadline(now, ttl)),
            },
        );
        space.entries.insert(
            index_key.to_string(),
            Entry {
                value: Value::Set(members),
                expires_at_ms: Some(deadline(now, index_ttl)),
            },
        );
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
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;

        match space.live(key, now) {
            None => return Ok(false),
            Some(Entry {
                value: Value::Text(_),
                ..
            }) => {}
            Some(_) => return Err(wrong_type(key)),
        }
        let mut members = match space.live(index_key, now) {
            None => HashSet::new(),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => std::mem::take(set),
            Some(_) => return Err(wrong_type(index_key)),
        };
        members.insert(member.to_string());

        space.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at_ms: Some(deadline(now, ttl)),
            },
        );
        space.entries.insert(
            index_key.to_string(),
            Entry {
                value: Value::Set(members),
                expires_at_ms: Some(deadline(now, index_ttl)),
            },
        );
        Ok(true)
    }

    async fn take_indexed(
        &self,
        key: &str,
        index_key: &str,
        member: &str,
    ) -> AppResult<Option<String>> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        let value = space.text(key, now)?;
        space.entries.remove(key);
        space.remove_member(index_key, member, now)?;
        Ok(value)
    }

    async fn delete_indexed(&self, key: &str, index_key: &str, member: &str) -> AppResult<bool> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;
        let existed = space.live(key, now).is_some();
        space.entries.remove(key);
        space.remove_member(index_key, member, now)?;
        Ok(existed)
    }

    async fn purge_index(&self, index_key: &str, record_prefix: &str) -> AppResult<u64> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;

        let members: Vec<String> = match space.set_mut(index_key, now)? {
            Some(set) => set.drain().collect(),
            None => return Ok(0),
        };
        space.entries.remove(index_key);

        let mut removed = 0;
        for member in members {
            let key = format!("{record_prefix}{member}");
            if space.live(&key, now).is_some() {
                space.entries.remove(&key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn hit_window(&self, key: &str, max: u64, window: Duration) -> AppResult<WindowHit> {
        let now = self.clock.now_millis();
        let mut space = self.keyspace.lock().await;

        let count = match space.text(key, now)? {
            Some(text) => text
                .parse::<u64>()
                .map_err(|_| AppError::cache(format!("Counter '{key}' is not an integer")))?,
            None => 0,
        };

        let (allowed, count) = if count < max {
            (true, count + 1)
        } else {
            (false, count)
        };

        let expires_at = match space.live(key, now).and_then(|e| e.expires_at_ms) {
            Some(at) => at,
            None => deadline(now, window),
        };
        space.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(count.to_string()),
                expires_at_ms: Some(expires_at),
            },
        );

        Ok(WindowHit {
            allowed,
            count,
            ttl: Duration::from_millis((expires_at - now).max(0) as u64),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
