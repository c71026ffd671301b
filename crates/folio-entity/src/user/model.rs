//! Principal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A principal that can sign in to the admin area.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Principal {
    /// Unique principal identifier.
    pub id: Uuid,
    /// Email address; unique, compared case-insensitively.
    pub email: String,
    /// Argon2 password hash (PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Principal role.
    pub role: UserRole,
    /// Number of consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// Account locked until this time (if locked).
    pub lock_until: Option<DateTime<Utc>>,
    /// Last successful login time.
    pub last_login: Option<DateTime<Utc>>,
    /// When the principal was created.
    pub created_at: DateTime<Utc>,
    /// When the principal was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Check if the account is locked at `now`.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    /// Whole minutes left on the lock, rounded up; `None` if not locked.
    pub fn lock_minutes_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        let until = self.lock_until.filter(|until| *until > now)?;
        let seconds = (until - now).num_seconds();
        Some(((seconds + 59) / 60).max(1))
    }
}

/// Data required to create a new principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrincipal {
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn principal(lock_until: Option<DateTime<Utc>>) -> Principal {
        let now = Utc::now();
        Principal {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::Admin,
            failed_login_attempts: 0,
            lock_until,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_lock_in_future_is_locked() {
        let now = Utc::now();
        let p = principal(Some(now + Duration::minutes(29) + Duration::seconds(30)));
        assert!(p.is_locked(now));
        assert_eq!(p.lock_minutes_remaining(now), Some(30));
    }

    #[test]
    fn test_expired_lock_is_not_locked() {
        let now = Utc::now();
        let p = principal(Some(now - Duration::seconds(1)));
        assert!(!p.is_locked(now));
        assert_eq!(p.lock_minutes_remaining(now), None);
        assert!(!principal(None).is_locked(now));
    }
}
