//! Request gate for protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use tracing::debug;

use folio_auth::{TokenKind, error};

use crate::error::ApiError;
use crate::state::AppState;

/// Edge-verifies the access token and stores its claims in the request
/// extensions.
///
/// The access cookie is preferred; an `Authorization: Bearer` header is
/// accepted for non-browser clients. This check is signature and expiry
/// only; handlers that need a live session extract `AuthSession`.
pub async fn require_access(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    let token = state
        .cookies
        .access_token(&jar)
        .map(str::to_string)
        .or(bearer)
        .ok_or_else(error::no_token)?;

    let Some(claims) = state.edge_verifier.verify(TokenKind::Access, &token) else {
        debug!(path = %request.uri().path(), "Access token rejected at the gate");
        return Err(error::invalid_token().into());
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
