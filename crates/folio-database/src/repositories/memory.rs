//! In-process credential store.
//!
//! Used by tests and single-node development setups. Each record mutation
//! happens under the map's per-entry lock; creation is serialized so the
//! uniqueness checks cannot race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use folio_core::result::AppResult;
use folio_core::AppError;
use folio_entity::user::{LockoutPolicy, NewPrincipal, Principal};

use super::credential::{CredentialStore, FailedAttempt};

/// Credential store held in a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    principals: DashMap<Uuid, Principal>,
    create_lock: Mutex<()>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        Ok(self
            .principals
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .map(|p| p.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        Ok(self.principals.get(&id).map(|p| p.value().clone()))
    }

    async fn create(&self, data: NewPrincipal) -> AppResult<Principal> {
        let _guard = self.create_lock.lock().await;

        if self
            .principals
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }
        if data.role.is_admin() && self.principals.iter().any(|p| p.role.is_admin()) {
            return Err(AppError::conflict("An admin account already exists"));
        }

        let now = Utc::now();
        let principal = Principal {
            id: Uuid::now_v7(),
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            failed_login_attempts: 0,
            lock_until: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn record_failed_attempt(
        &self,
        id: Uuid,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<FailedAttempt> {
        let mut entry = self
            .principals
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        let (attempts, lock_until) =
            policy.register_failure(entry.failed_login_attempts, entry.lock_until, now);
        entry.failed_login_attempts = attempts;
        entry.lock_until = lock_until;
        entry.updated_at = now;

        Ok(FailedAttempt {
            attempts,
            lock_until,
        })
    }

    async fn reset_failed_attempts(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(mut entry) = self.principals.get_mut(&id) {
            entry.failed_login_attempts = 0;
            entry.lock_until = None;
            entry.last_login = Some(now);
            entry.updated_at = now;
        }
        Ok(())
    }

    async fn unlock(&self, id: Uuid) -> AppResult<()> {
        let mut entry = self
            .principals
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        entry.failed_login_attempts = 0;
        entry.lock_until = None;
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Principal>> {
        let mut principals: Vec<Principal> =
            self.principals.iter().map(|p| p.value().clone()).collect();
        principals.sort_by_key(|p| p.created_at);
        Ok(principals)
    }
}
