//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Query of `DELETE /api/auth/sessions`.
///
/// Exactly one of `sessionId` or `all=true` selects what to revoke.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionsQuery {
    /// A single session to revoke.
    pub session_id: Option<String>,
    /// Revoke every session of the caller.
    #[serde(default)]
    pub all: bool,
}
