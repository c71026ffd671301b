//! Token claims and the validity rules shared by both verifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_core::config::AuthConfig;
use folio_entity::user::UserRole;

/// Which of the two token families a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived request credential.
    Access,
    /// Long-lived credential used only to rotate the pair.
    Refresh,
}

impl TokenKind {
    /// Lowercase name, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// JWT claims carried by both token kinds.
///
/// `role` is a closed enum, so a token naming any other role fails to
/// deserialize and therefore fails verification. The claim set is closed
/// too: a token carrying anything else (`aud`, `iss`, `nbf`, `jti`, ...) was
/// not minted here and is rejected by both verifiers alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject: the principal id.
    pub sub: Uuid,
    /// Principal role at issuance.
    pub role: UserRole,
    /// Session this token is bound to.
    pub sid: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Signing secret version; absent means the oldest version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<u32>,
    /// Principal email, present on tokens minted with it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// What a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// Principal id.
    pub user_id: Uuid,
    /// Principal role.
    pub role: UserRole,
    /// Session id the token is bound to.
    pub session_id: String,
    /// Optional email claim.
    pub email: Option<String>,
}

/// Time-based validity rules applied after the signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimsPolicy {
    access_ttl: i64,
    refresh_ttl: i64,
}

impl ClaimsPolicy {
    /// Policy with explicit per-kind lifetimes in seconds.
    pub fn new(access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        Self {
            access_ttl: access_ttl_seconds,
            refresh_ttl: refresh_ttl_seconds,
        }
    }

    /// Policy from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.access_ttl_seconds as i64,
            config.refresh_ttl_seconds as i64,
        )
    }

    /// Lifetime of tokens of `kind`, in seconds.
    pub fn ttl(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Whether `claims` are currently valid for `kind`.
    ///
    /// No clock-skew allowance. The age check does not trust `exp`: a token
    /// older than its kind's lifetime is rejected even if `exp` says
    /// otherwise.
    pub fn accepts(&self, kind: TokenKind, claims: &Claims, now: i64) -> bool {
        let ttl = self.ttl(kind);
        claims.exp > now
            && claims.iat <= now
            && now - claims.iat <= ttl
            && claims.exp - claims.iat <= ttl
    }
}
