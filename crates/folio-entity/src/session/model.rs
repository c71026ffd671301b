//! Session entity model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserRole;

/// A server-side session record.
///
/// Stored as JSON in the session store; `expires_at` always matches the
/// store-level TTL of the record. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque random session identifier.
    pub session_id: String,
    /// The principal this session belongs to.
    pub user_id: Uuid,
    /// Principal email at session creation.
    pub email: String,
    /// Principal role at session creation.
    pub role: UserRole,
    /// User-Agent header value.
    pub user_agent: String,
    /// Client IP address.
    pub ip_address: String,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Expiry time (epoch ms).
    pub expires_at: i64,
}

impl Session {
    /// Whether the session has expired at `now_ms`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }

    /// Milliseconds left before expiry (0 if expired).
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at - now_ms).max(0)
    }
}
