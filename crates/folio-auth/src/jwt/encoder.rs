//! Token issuance.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use folio_core::clock::Clock;
use folio_core::error::AppError;
use folio_core::result::AppResult;

use super::claims::{Claims, ClaimsPolicy, TokenKind, TokenSubject};
use super::secrets::TokenKeys;

/// A signed token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Expiry (seconds since epoch).
    pub expires_at: i64,
}

/// Access and refresh tokens bound to the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: IssuedToken,
    /// Long-lived refresh token.
    pub refresh: IssuedToken,
}

/// Mints HS256 tokens from the newest secret of each ring.
#[derive(Debug, Clone)]
pub struct JwtEncoder {
    keys: TokenKeys,
    policy: ClaimsPolicy,
    clock: Arc<dyn Clock>,
}

impl JwtEncoder {
    /// Creates an encoder.
    pub fn new(keys: TokenKeys, policy: ClaimsPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            policy,
            clock,
        }
    }

    /// Signs a token of `kind` for `subject`.
    pub fn issue(&self, kind: TokenKind, subject: &TokenSubject) -> AppResult<IssuedToken> {
        let now = self.clock.now_seconds();
        let (version, secret) = self.keys.ring(kind).signing();

        let claims = Claims {
            sub: subject.user_id,
            role: subject.role,
            sid: subject.session_id.clone(),
            iat: now,
            exp: now + self.policy.ttl(kind),
            v: Some(version),
            email: subject.email.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| {
            AppError::internal(format!("Failed to encode {} token: {e}", kind.as_str()))
        })?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Signs an access and a refresh token for the same subject.
    pub fn issue_pair(&self, subject: &TokenSubject) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access: self.issue(TokenKind::Access, subject)?,
            refresh: self.issue(TokenKind::Refresh, subject)?,
        })
    }
}
