//! Response DTOs.

use serde::{Deserialize, Serialize};

use folio_entity::session::Session;

/// Body of a successful sign-in or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    /// The new session.
    pub session_id: String,
    /// Access token expiry (epoch seconds).
    pub access_expires_at: i64,
    /// Refresh token expiry (epoch seconds).
    pub refresh_expires_at: i64,
}

/// One entry of the sessions listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Session id.
    pub session_id: String,
    /// User-Agent recorded at creation.
    pub user_agent: String,
    /// Client IP recorded at creation.
    pub ip_address: String,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Expiry time (epoch ms).
    pub expires_at: i64,
    /// Whether this is the session making the request.
    pub is_current: bool,
}

impl SessionResponse {
    /// Listing entry for `session`.
    pub fn from_session(session: Session, current_id: &str) -> Self {
        let is_current = session.session_id == current_id;
        Self {
            session_id: session.session_id,
            user_agent: session.user_agent,
            ip_address: session.ip_address,
            created_at: session.created_at,
            expires_at: session.expires_at,
            is_current,
        }
    }
}

/// Body of a session revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    /// How many sessions were revoked.
    pub revoked: u64,
    /// Whether the caller's own session was among them.
    pub signed_out: bool,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Always `true`.
    pub success: bool,
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// A successful acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the session store answered.
    pub cache: bool,
    /// Crate version.
    pub version: String,
}
