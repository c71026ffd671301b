//! PostgreSQL credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use folio_core::error::{AppError, ErrorKind};
use folio_core::result::AppResult;
use folio_entity::user::{LockoutPolicy, NewPrincipal, Principal};

use super::credential::{CredentialStore, FailedAttempt};

const EMAIL_UNIQUE: &str = "users_email_lower_key";
const SINGLE_ADMIN: &str = "users_single_admin_key";

/// Credential store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn create(&self, data: NewPrincipal) -> AppResult<Principal> {
        sqlx::query_as::<_, Principal>(
            "INSERT INTO users (id, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(EMAIL_UNIQUE) => {
                AppError::conflict(format!("Email '{}' is already registered", data.email))
            }
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(SINGLE_ADMIN) => {
                AppError::conflict("An admin account already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    async fn record_failed_attempt(
        &self,
        id: Uuid,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<FailedAttempt> {
        // Right-hand sides read the pre-update row, so both columns see the
        // same "lock expired" decision.
        let row: Option<(i32, Option<DateTime<Utc>>)> = sqlx::query_as(
            "UPDATE users SET \
                failed_login_attempts = CASE \
                    WHEN lock_until IS NOT NULL AND lock_until <= $2 THEN 1 \
                    ELSE failed_login_attempts + 1 END, \
                lock_until = CASE \
                    WHEN (CASE WHEN lock_until IS NOT NULL AND lock_until <= $2 THEN 1 \
                               ELSE failed_login_attempts + 1 END) >= $3 THEN $4 \
                    WHEN lock_until IS NOT NULL AND lock_until <= $2 THEN NULL \
                    ELSE lock_until END, \
                updated_at = $2 \
             WHERE id = $1 \
             RETURNING failed_login_attempts, lock_until",
        )
        .bind(id)
        .bind(now)
        .bind(policy.threshold)
        .bind(now + policy.duration)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record failed login", e)
        })?;

        let (attempts, lock_until) =
            row.ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        Ok(FailedAttempt {
            attempts,
            lock_until,
        })
    }

    async fn reset_failed_attempts(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, lock_until = NULL, \
                              last_login = $2, updated_at = $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reset failed attempts", e)
        })?;
        Ok(())
    }

    async fn unlock(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, lock_until = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unlock user", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }
}
