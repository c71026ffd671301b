//! Key builders for everything the auth core keeps in the store.
//!
//! Each record family has its own namespace so a session id can never
//! collide with an index or a rate-limit bucket. The provider adds the
//! configured global prefix on top.

use uuid::Uuid;

/// Prefix shared by every session record key.
pub const SESSION_PREFIX: &str = "session:";

/// Key of a session record.
pub fn session(session_id: &str) -> String {
    format!("{SESSION_PREFIX}{session_id}")
}

/// Key of the set indexing one user's session ids.
pub fn user_sessions(user_id: Uuid) -> String {
    format!("user_sessions:{user_id}")
}

/// Key of a fixed-window rate-limit bucket.
pub fn rate_limit(action: &str, identifier: &str) -> String {
    format!("ratelimit:{action}:{identifier}")
}
