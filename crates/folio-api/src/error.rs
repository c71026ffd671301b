//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use folio_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authentication | ErrorKind::Security => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Locked => StatusCode::LOCKED,
        ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Cache
        | ErrorKind::Configuration
        | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn default_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "validation-error",
        ErrorKind::Authentication => "unauthorized",
        ErrorKind::NotFound => "not-found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Locked => "account-locked",
        ErrorKind::RateLimit => "rate-limited",
        ErrorKind::Security => "security-error",
        _ => "internal-error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        let body = if err.kind.is_infrastructure() {
            error!(kind = %err.kind, error = %err, "Request failed on infrastructure error");
            ApiErrorResponse {
                error: default_code(err.kind).to_string(),
                message: "An internal error occurred. Please try again later.".to_string(),
                details: None,
            }
        } else {
            if err.kind == ErrorKind::Security {
                warn!(code = ?err.code, "Security error returned to client");
            }
            ApiErrorResponse {
                error: err.code.unwrap_or(default_code(err.kind)).to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
            }
        };

        let retry_after = body
            .details
            .as_ref()
            .and_then(|d| d.get("retryAfter"))
            .and_then(|v| v.as_u64())
            .filter(|_| status == StatusCode::TOO_MANY_REQUESTS);

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}
