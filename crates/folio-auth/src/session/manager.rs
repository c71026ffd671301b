//! Sign-in, refresh, and sign-out flows.
//!
//! Every step of a flow is a gate: the first refusal short-circuits into one
//! of the fixed auth errors and later steps never run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

use folio_core::clock::Clock;
use folio_core::config::{AuthConfig, LOGIN_ACTION};
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_database::CredentialStore;
use folio_entity::session::Session;
use folio_entity::user::{LockoutPolicy, Principal};

use crate::error;
use crate::jwt::{Claims, JwtEncoder, TokenKind, TokenPair, TokenSubject, TokenVerifier};
use crate::password::PasswordHasher;
use crate::rate_limit::RateLimiter;

use super::store::{ClientInfo, SessionStore};

/// Sign-in request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    /// Principal email.
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A new session with its token pair.
#[derive(Debug, Clone, Serialize)]
pub struct SignInResult {
    /// The session the tokens are bound to.
    pub session: Session,
    /// Access and refresh tokens.
    pub tokens: TokenPair,
}

/// Orchestrates the credential store, session store, token codec, and
/// rate limiter.
#[derive(Debug, Clone)]
pub struct SessionManager {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<SessionStore>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    /// Full verifier, used for refresh tokens and the sign-out fallback.
    verifier: Arc<dyn TokenVerifier>,
    limiter: Arc<RateLimiter>,
    lockout: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Creates a manager.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<SessionStore>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        verifier: Arc<dyn TokenVerifier>,
        limiter: Arc<RateLimiter>,
        lockout: LockoutPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            hasher,
            encoder,
            verifier,
            limiter,
            lockout,
            clock,
        }
    }

    /// Lockout policy from the auth configuration.
    pub fn lockout_policy(config: &AuthConfig) -> LockoutPolicy {
        LockoutPolicy::new(
            config.max_failed_attempts,
            chrono::Duration::minutes(config.lockout_duration_minutes as i64),
        )
    }

    /// The session store this manager writes to.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Signs a principal in from an email and password.
    pub async fn sign_in(
        &self,
        credentials: &Credentials,
        client: &ClientInfo,
    ) -> AppResult<SignInResult> {
        credentials
            .validate()
            .map_err(|e| error::validation_failed(&e))?;

        let decision = self.limiter.check(&client.ip_address, LOGIN_ACTION).await;
        if !decision.allowed {
            warn!(ip = %client.ip_address, "Sign-in rate limited");
            return Err(error::rate_limited(decision.retry_after.unwrap_or(1)));
        }

        let Some(principal) = self.credentials.find_by_email(&credentials.email).await? else {
            self.hasher.verify_dummy(&credentials.password);
            debug!(ip = %client.ip_address, "Sign-in for unknown email");
            return Err(error::invalid_credentials());
        };

        let now = self.clock.now();
        if let Some(minutes) = principal.lock_minutes_remaining(now) {
            info!(user_id = %principal.id, minutes, "Sign-in refused; account locked");
            return Err(error::account_locked(minutes));
        }

        if !self
            .hasher
            .verify_password(&credentials.password, &principal.password_hash)?
        {
            let attempt = self
                .credentials
                .record_failed_attempt(principal.id, &self.lockout, now)
                .await?;
            if attempt.is_locked(now) {
                warn!(
                    user_id = %principal.id,
                    attempts = attempt.attempts,
                    ip = %client.ip_address,
                    "Account locked after repeated sign-in failures"
                );
            } else {
                debug!(user_id = %principal.id, attempts = attempt.attempts, "Wrong password");
            }
            return Err(error::invalid_credentials());
        }

        self.credentials
            .reset_failed_attempts(principal.id, now)
            .await?;
        self.limiter.reset(&client.ip_address, LOGIN_ACTION).await;

        let result = self.open_session(&principal, client).await?;
        info!(
            user_id = %principal.id,
            session_id = %result.session.session_id,
            ip = %client.ip_address,
            "Signed in"
        );
        Ok(result)
    }

    /// Rotates a refresh token into a new session and token pair.
    ///
    /// The replacement session is written first and the old one is then
    /// taken out of the store atomically, so of two concurrent uses of one
    /// token exactly one succeeds; the loser's replacement is discarded. A verified token
    /// whose session is already gone is treated as a replay: every session
    /// of the owner is revoked.
    pub async fn refresh(
        &self,
        refresh_token: Option<&str>,
        client: &ClientInfo,
    ) -> AppResult<SignInResult> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(error::no_token)?;

        let claims = self
            .verifier
            .verify(TokenKind::Refresh, token)
            .ok_or_else(error::invalid_token)?;

        let Some(principal) = self.credentials.find_by_id(claims.sub).await? else {
            warn!(user_id = %claims.sub, "Refresh for a principal that no longer exists");
            self.sessions.delete(&claims.sid).await;
            return Err(error::session_not_found());
        };

        // The replacement is stored before the old session is taken, so a
        // failed write leaves the caller's current session usable.
        let result = self.open_session(&principal, client).await?;
        let new_id = &result.session.session_id;

        let old = match self.sessions.consume(&claims.sid, claims.sub).await {
            Ok(Some(old)) => old,
            Ok(None) => {
                self.sessions.delete(new_id).await;
                return Err(self.on_replay(&claims, client).await);
            }
            Err(e) => {
                self.sessions.delete(new_id).await;
                return Err(e);
            }
        };
        if old.user_id != claims.sub {
            warn!(session_id = %old.session_id, "Refresh token subject does not own its session");
            self.sessions.delete(new_id).await;
            return Err(error::invalid_token());
        }

        info!(
            user_id = %principal.id,
            old_session_id = %old.session_id,
            session_id = %new_id,
            "Session rotated"
        );
        Ok(result)
    }

    async fn on_replay(&self, claims: &Claims, client: &ClientInfo) -> AppError {
        error!(
            user_id = %claims.sub,
            session_id = %claims.sid,
            ip = %client.ip_address,
            user_agent = %client.user_agent,
            "Refresh token replay detected; revoking all sessions"
        );
        if let Err(e) = self.sessions.delete_all_for_user(claims.sub).await {
            error!(user_id = %claims.sub, error = %e, "Failed to revoke sessions after replay");
        }
        error::replay_detected()
    }

    /// Ends the session named by either token. Never fails.
    ///
    /// The access token is preferred; the refresh token covers clients
    /// whose access token has already expired.
    pub async fn sign_out(&self, access_token: Option<&str>, refresh_token: Option<&str>) {
        let claims = access_token
            .and_then(|t| self.verifier.verify(TokenKind::Access, t))
            .or_else(|| refresh_token.and_then(|t| self.verifier.verify(TokenKind::Refresh, t)));

        match claims {
            Some(claims) => {
                let deleted = self.sessions.delete(&claims.sid).await;
                info!(user_id = %claims.sub, session_id = %claims.sid, deleted, "Signed out");
            }
            None => debug!("Sign-out without a verifiable token"),
        }
    }

    /// Deep check for a verified access token.
    ///
    /// The session must still exist and belong to the token's subject. A
    /// successful check also slides the session's expiry forward.
    pub async fn authenticate(&self, claims: &Claims) -> AppResult<Session> {
        let session = self
            .sessions
            .extend(&claims.sid)
            .await
            .ok_or_else(error::session_not_found)?;

        if session.user_id != claims.sub {
            warn!(
                session_id = %claims.sid,
                user_id = %claims.sub,
                "Access token subject does not own its session"
            );
            return Err(error::session_not_found());
        }
        Ok(session)
    }

    /// Live sessions of the caller, newest first.
    pub async fn list_sessions(&self, claims: &Claims) -> Vec<Session> {
        self.sessions.list_for_user(claims.sub).await
    }

    /// Revokes one of the caller's sessions.
    pub async fn revoke_session(&self, claims: &Claims, session_id: &str) -> AppResult<()> {
        let owned = self
            .sessions
            .get(session_id)
            .await
            .is_some_and(|s| s.user_id == claims.sub);
        if !owned || !self.sessions.delete(session_id).await {
            return Err(AppError::not_found("Session not found").with_code("not-found"));
        }

        info!(user_id = %claims.sub, session_id, "Session revoked");
        Ok(())
    }

    /// Revokes every session of the caller. Returns how many were revoked.
    pub async fn revoke_all(&self, claims: &Claims) -> AppResult<u64> {
        self.revoke_user(claims.sub).await
    }

    /// Revokes every session of `user_id`.
    pub async fn revoke_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.sessions.delete_all_for_user(user_id).await
    }

    async fn open_session(
        &self,
        principal: &Principal,
        client: &ClientInfo,
    ) -> AppResult<SignInResult> {
        let session = self.sessions.create(principal, client).await?;
        let subject = TokenSubject {
            user_id: principal.id,
            role: principal.role,
            session_id: session.session_id.clone(),
            email: Some(principal.email.clone()),
        };
        let tokens = self.encoder.issue_pair(&subject)?;
        Ok(SignInResult { session, tokens })
    }
}
