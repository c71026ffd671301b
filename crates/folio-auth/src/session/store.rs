//! Redis-resident session records with a per-user index.
//!
//! A session lives under `session:{id}` with a store TTL equal to its
//! `expires_at`. Its id is also a member of `user_sessions:{user}`, a set
//! that outlives every session in it. The index is only a lookup aid: it
//! may hold ids whose records are gone, so every read goes back to the
//! record itself.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use folio_cache::CacheManager;
use folio_cache::keys;
use folio_core::clock::Clock;
use folio_core::config::SessionConfig;
use folio_core::result::AppResult;
use folio_core::traits::CacheProvider;
use folio_entity::session::Session;
use folio_entity::user::Principal;

/// Request metadata recorded on a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client IP address.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: String,
}

/// Session persistence over the shared store.
///
/// Reads and deletes degrade to "no session" when the store fails, so an
/// outage can only deny access. Creation and bulk revocation propagate
/// errors.
#[derive(Debug, Clone)]
pub struct SessionStore {
    cache: Arc<CacheManager>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(cache: Arc<CacheManager>, config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            config,
            clock,
        }
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_seconds)
    }

    fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_seconds + self.config.index_grace_seconds)
    }

    /// Writes `session` and its index membership in one atomic batch.
    async fn put(&self, session: &Session, ttl: Duration) -> AppResult<()> {
        let payload = serde_json::to_string(session)?;
        self.cache
            .put_indexed(
                &keys::session(&session.session_id),
                &payload,
                ttl,
                &keys::user_sessions(session.user_id),
                &session.session_id,
                self.index_ttl(),
            )
            .await
    }

    /// Creates and stores a new session for `principal`.
    pub async fn create(&self, principal: &Principal, client: &ClientInfo) -> AppResult<Session> {
        let now = self.clock.now_millis();
        let session = Session {
            session_id: generate_session_id(),
            user_id: principal.id,
            email: principal.email.clone(),
            role: principal.role,
            user_agent: client.user_agent.clone(),
            ip_address: client.ip_address.clone(),
            created_at: now,
            expires_at: now + self.ttl().as_millis() as i64,
        };

        self.put(&session, self.ttl()).await?;

        info!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            ip = %session.ip_address,
            "Session created"
        );
        Ok(session)
    }

    /// Raw record read; `Ok(None)` for missing or unreadable records.
    async fn load(&self, session_id: &str) -> AppResult<Option<Session>> {
        let Some(payload) = self.cache.get(&keys::session(session_id)).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Session>(&payload) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(session_id, error = %e, "Discarding unreadable session record");
                Ok(None)
            }
        }
    }

    /// Drops an expired record and its index entry.
    async fn evict(&self, session: &Session) {
        if let Err(e) = self
            .cache
            .delete_indexed(
                &keys::session(&session.session_id),
                &keys::user_sessions(session.user_id),
                &session.session_id,
            )
            .await
        {
            warn!(session_id = %session.session_id, error = %e, "Failed to evict expired session");
        }
    }

    /// Looks up a live session.
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        let session = match self.load(session_id).await {
            Ok(session) => session?,
            Err(e) => {
                warn!(session_id, error = %e, "Session read failed; treating as absent");
                return None;
            }
        };

        if session.is_expired(self.clock.now_millis()) {
            debug!(session_id, "Session past expiresAt; evicting");
            self.evict(&session).await;
            return None;
        }
        Some(session)
    }

    /// Deletes a session and its index entry. Returns whether it existed.
    pub async fn delete(&self, session_id: &str) -> bool {
        let session = match self.load(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => return false,
            Err(e) => {
                warn!(session_id, error = %e, "Session read failed during delete");
                return false;
            }
        };

        match self
            .cache
            .delete_indexed(
                &keys::session(session_id),
                &keys::user_sessions(session.user_id),
                session_id,
            )
            .await
        {
            Ok(existed) => {
                if existed {
                    info!(session_id, user_id = %session.user_id, "Session deleted");
                }
                existed
            }
            Err(e) => {
                warn!(session_id, error = %e, "Session delete failed");
                false
            }
        }
    }

    /// Live sessions of `user_id`, newest first.
    ///
    /// Index entries whose record is missing or expired are removed on the
    /// way through.
    pub async fn list_for_user(&self, user_id: Uuid) -> Vec<Session> {
        match self.scan_user(user_id).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Session listing failed");
                Vec::new()
            }
        }
    }

    async fn scan_user(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let index_key = keys::user_sessions(user_id);
        let ids = self.cache.set_members(&index_key).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let record_keys: Vec<String> = ids.iter().map(|id| keys::session(id)).collect();
        let payloads = self.cache.get_many(&record_keys).await?;
        let now = self.clock.now_millis();

        let mut live = Vec::with_capacity(ids.len());
        let mut stale = Vec::new();
        let mut expired_keys = Vec::new();

        for ((id, key), payload) in ids.into_iter().zip(record_keys).zip(payloads) {
            match payload.and_then(|p| serde_json::from_str::<Session>(&p).ok()) {
                Some(session) if session.user_id != user_id => stale.push(id),
                Some(session) if session.is_expired(now) => {
                    expired_keys.push(key);
                    stale.push(id);
                }
                Some(session) => live.push(session),
                None => stale.push(id),
            }
        }

        if !expired_keys.is_empty() {
            self.cache.delete_many(&expired_keys).await?;
        }
        if !stale.is_empty() {
            let removed = self.cache.set_remove(&index_key, &stale).await?;
            debug!(user_id = %user_id, removed, "Repaired session index");
        }

        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(live)
    }

    /// Deletes every session of `user_id` and the index itself.
    ///
    /// Runs as one atomic store operation, so a session created
    /// concurrently either goes with the rest or keeps its index entry.
    /// Returns how many session records were deleted. Errors propagate so
    /// a bulk revocation never silently does nothing.
    pub async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let deleted = self
            .cache
            .purge_index(&keys::user_sessions(user_id), keys::SESSION_PREFIX)
            .await?;

        info!(user_id = %user_id, deleted, "All sessions revoked");
        Ok(deleted)
    }

    /// Sliding renewal.
    ///
    /// Pushes `expires_at` to `now + ttl` once the remaining lifetime has
    /// dropped to `(1 - renew_threshold)` of the full window or below;
    /// before that it is a no-op. Returns the (possibly renewed) session,
    /// or `None` if there is no live session. The write only lands if the
    /// record still exists, so a revocation racing the renewal wins.
    pub async fn extend(&self, session_id: &str) -> Option<Session> {
        let mut session = self.get(session_id).await?;

        let now = self.clock.now_millis();
        let window = self.ttl().as_millis() as i64;
        let renew_below = ((1.0 - self.config.renew_threshold) * window as f64) as i64;
        if session.remaining_ms(now) > renew_below {
            return Some(session);
        }

        let previous = session.expires_at;
        session.expires_at = now + window;
        let payload = match serde_json::to_string(&session) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(session_id, error = %e, "Session renewal failed");
                session.expires_at = previous;
                return Some(session);
            }
        };

        match self
            .cache
            .renew_indexed(
                &keys::session(session_id),
                &payload,
                self.ttl(),
                &keys::user_sessions(session.user_id),
                session_id,
                self.index_ttl(),
            )
            .await
        {
            Ok(true) => {
                debug!(session_id, "Session renewed");
                Some(session)
            }
            Ok(false) => {
                debug!(session_id, "Session revoked during renewal");
                None
            }
            Err(e) => {
                warn!(session_id, error = %e, "Session renewal failed");
                session.expires_at = previous;
                Some(session)
            }
        }
    }

    /// Atomically takes a session out of the store.
    ///
    /// At most one caller ever receives a given session. An entry already
    /// past its `expires_at` counts as absent.
    pub async fn consume(&self, session_id: &str, user_id: Uuid) -> AppResult<Option<Session>> {
        let payload = self
            .cache
            .take_indexed(
                &keys::session(session_id),
                &keys::user_sessions(user_id),
                session_id,
            )
            .await?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        let session = match serde_json::from_str::<Session>(&payload) {
            Ok(session) => session,
            Err(e) => {
                warn!(session_id, error = %e, "Consumed unreadable session record");
                return Ok(None);
            }
        };

        if session.is_expired(self.clock.now_millis()) {
            return Ok(None);
        }
        Ok(Some(session))
    }
}

/// 32 random bytes, base64url without padding.
fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
