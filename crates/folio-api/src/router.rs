//! Route definitions for the Folio HTTP API.
//!
//! All routes are mounted under `/api`. Session management routes sit
//! behind the `require_access` gate.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the API router with state applied.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(session_routes(state.clone()))
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Sign-in, refresh, and sign-out. Public: each handler does its own checks.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signin", post(handlers::auth::sign_in))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/signout", post(handlers::auth::sign_out))
}

/// Session listing and revocation for the caller.
fn session_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/auth/sessions",
            get(handlers::sessions::list_sessions).delete(handlers::sessions::revoke_sessions),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_access,
        ))
}

/// Liveness.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
