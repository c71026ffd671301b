//! `AuthSession` extractor: the deep session check behind the request gate.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use folio_auth::Claims;
use folio_auth::error;
use folio_entity::session::Session;

use crate::error::ApiError;
use crate::state::AppState;

/// A verified access token whose session is still live.
///
/// Requires `require_access` to have run first; it leaves the verified
/// claims in the request extensions. Extracting also slides the session's
/// expiry forward.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Claims of the presented access token.
    pub claims: Claims,
    /// The session the token is bound to.
    pub session: Session,
}

impl AuthSession {
    /// Whether `session_id` is the session of this request.
    pub fn is_current(&self, session_id: &str) -> bool {
        self.session.session_id == session_id
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(error::no_token)?;

        let session = state.session_manager.authenticate(&claims).await?;
        Ok(Self { claims, session })
    }
}
