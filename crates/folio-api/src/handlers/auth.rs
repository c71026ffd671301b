//! Auth handlers: sign-in, refresh, sign-out.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use folio_auth::{Credentials, SignInResult};
use folio_core::error::{AppError, ErrorKind};

use crate::dto::response::{MessageResponse, SignInResponse};
use crate::error::ApiError;
use crate::extractors::ClientMeta;
use crate::state::AppState;

impl From<&SignInResult> for SignInResponse {
    fn from(result: &SignInResult) -> Self {
        Self {
            session_id: result.session.session_id.clone(),
            access_expires_at: result.tokens.access.expires_at,
            refresh_expires_at: result.tokens.refresh.expires_at,
        }
    }
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    AppError::validation(rejection.body_text())
        .with_code("validation-error")
        .into()
}

/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(CookieJar, Json<SignInResponse>), ApiError> {
    let Json(credentials) = payload.map_err(malformed_body)?;

    let result = state.session_manager.sign_in(&credentials, &client).await?;

    let jar = state.cookies.issue(jar, &result.tokens);
    Ok((jar, Json(SignInResponse::from(&result))))
}

/// POST /api/auth/refresh
///
/// Auth failures also clear both cookies so the client drops tokens that
/// can no longer work.
pub async fn refresh(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SignInResponse>), (CookieJar, ApiError)> {
    let token = state.cookies.refresh_token(&jar).map(str::to_string);

    match state
        .session_manager
        .refresh(token.as_deref(), &client)
        .await
    {
        Ok(result) => {
            let jar = state.cookies.issue(jar, &result.tokens);
            Ok((jar, Json(SignInResponse::from(&result))))
        }
        Err(err) if matches!(err.kind, ErrorKind::Authentication | ErrorKind::Security) => {
            Err((state.cookies.clear(jar), err.into()))
        }
        Err(err) => Err((jar, err.into())),
    }
}

/// POST /api/auth/signout
///
/// Always succeeds and always clears both cookies.
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());
    let access = state
        .cookies
        .access_token(&jar)
        .map(str::to_string)
        .or(bearer);
    let refresh = state.cookies.refresh_token(&jar).map(str::to_string);

    state
        .session_manager
        .sign_out(access.as_deref(), refresh.as_deref())
        .await;

    (
        state.cookies.clear(jar),
        Json(MessageResponse::ok("Signed out")),
    )
}
