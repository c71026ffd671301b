//! Client-facing auth failures.
//!
//! Every refusal the auth flows produce is one of these. Messages are
//! deliberately generic; the `code` is what clients branch on.

use serde_json::json;
use validator::ValidationErrors;

use folio_core::AppError;

/// Wrong email or password. Also used for unknown emails.
pub fn invalid_credentials() -> AppError {
    AppError::authentication("Invalid email or password").with_code("invalid-credentials")
}

/// The account is locked for `minutes` more minutes.
pub fn account_locked(minutes: i64) -> AppError {
    AppError::locked(format!(
        "Account is temporarily locked. Try again in {minutes} minute(s)."
    ))
    .with_code("account-locked")
    .with_details(json!({ "minutesRemaining": minutes }))
}

/// Too many attempts; retry after `retry_after` seconds.
pub fn rate_limited(retry_after: u64) -> AppError {
    AppError::rate_limit("Too many attempts. Please try again later.")
        .with_code("rate-limited")
        .with_details(json!({ "retryAfter": retry_after }))
}

/// No token was presented.
pub fn no_token() -> AppError {
    AppError::authentication("Authentication required").with_code("no-token")
}

/// The presented token did not verify.
pub fn invalid_token() -> AppError {
    AppError::authentication("Invalid or expired token").with_code("invalid-token")
}

/// The token verified but its session is gone.
pub fn session_not_found() -> AppError {
    AppError::authentication("Session has ended. Please sign in again.")
        .with_code("session-not-found")
}

/// A refresh token was used after its session had been consumed.
pub fn replay_detected() -> AppError {
    AppError::security("Session was revoked for your protection. Please sign in again.")
        .with_code("replay-detected")
}

/// Request body failed schema validation.
pub fn validation_failed(errors: &ValidationErrors) -> AppError {
    let fields: serde_json::Map<String, serde_json::Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect();

    AppError::validation("Request validation failed")
        .with_code("validation-error")
        .with_details(json!({ "fields": fields }))
}
