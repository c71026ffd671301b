//! Credential store contract used by the login flow and the setup CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use folio_core::result::AppResult;
use folio_entity::user::{LockoutPolicy, NewPrincipal, Principal};

/// Counter state after a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedAttempt {
    /// Consecutive failures including this one.
    pub attempts: i32,
    /// Lock expiry, if the account is now locked.
    pub lock_until: Option<DateTime<Utc>>,
}

impl FailedAttempt {
    /// Whether this failure left the account locked at `now`.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }
}

/// Persistent principal records with lockout counters.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Look up a principal by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>>;

    /// Look up a principal by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>>;

    /// Insert a principal.
    ///
    /// Fails with a conflict when the email is taken (case-insensitively) or
    /// when a second admin would be created.
    async fn create(&self, principal: NewPrincipal) -> AppResult<Principal>;

    /// Count one failed password check, locking the account per `policy`.
    ///
    /// The increment and the lock decision are one atomic update.
    async fn record_failed_attempt(
        &self,
        id: Uuid,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<FailedAttempt>;

    /// Clear the failure counter and any lock, and stamp `last_login`.
    async fn reset_failed_attempts(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()>;

    /// Lift a lock without a successful login.
    async fn unlock(&self, id: Uuid) -> AppResult<()>;

    /// All principals, oldest first.
    async fn list(&self) -> AppResult<Vec<Principal>>;
}
