//! Session management for the signed-in principal.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum_extra::extract::CookieJar;

use folio_core::error::AppError;

use crate::dto::request::RevokeSessionsQuery;
use crate::dto::response::{RevokeResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::AuthSession;
use crate::state::AppState;

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Json<Vec<SessionResponse>> {
    let sessions = state.session_manager.list_sessions(&auth.claims).await;
    Json(
        sessions
            .into_iter()
            .map(|s| SessionResponse::from_session(s, &auth.session.session_id))
            .collect(),
    )
}

/// DELETE /api/auth/sessions?sessionId=… or ?all=true
///
/// Revoking the session making the request also clears its cookies.
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AuthSession,
    jar: CookieJar,
    query: Result<Query<RevokeSessionsQuery>, QueryRejection>,
) -> Result<(CookieJar, Json<RevokeResponse>), ApiError> {
    let Query(query) = query.map_err(|e| {
        ApiError::from(AppError::validation(e.body_text()).with_code("validation-error"))
    })?;

    let (revoked, signed_out) = match (query.all, query.session_id.as_deref()) {
        (true, None) => (state.session_manager.revoke_all(&auth.claims).await?, true),
        (false, Some(session_id)) => {
            state
                .session_manager
                .revoke_session(&auth.claims, session_id)
                .await?;
            (1, auth.is_current(session_id))
        }
        _ => {
            return Err(AppError::validation("Pass either sessionId or all=true")
                .with_code("validation-error")
                .into());
        }
    };

    let jar = if signed_out {
        state.cookies.clear(jar)
    } else {
        jar
    };
    Ok((jar, Json(RevokeResponse { revoked, signed_out })))
}
