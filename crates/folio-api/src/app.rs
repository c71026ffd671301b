//! Application builder: wires components into state and layers the router.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use folio_auth::jwt::{ClaimsPolicy, TokenKeys};
use folio_auth::{
    EdgeDecoder, JwtDecoder, JwtEncoder, PasswordHasher, RateLimiter, SessionManager,
    SessionStore,
};
use folio_cache::CacheManager;
use folio_core::clock::Clock;
use folio_core::config::AppConfig;
use folio_core::result::AppResult;
use folio_database::CredentialStore;

use crate::cookies::AuthCookies;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Largest accepted request body. Auth payloads are tiny.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Builds the auth components and the shared state from configuration.
///
/// The credential store, session/rate-limit store, and clock are passed in
/// so the server can hand over Postgres and Redis while tests use the
/// in-memory providers.
pub fn build_state(
    config: Arc<AppConfig>,
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<CacheManager>,
    clock: Arc<dyn Clock>,
) -> AppResult<AppState> {
    let keys = TokenKeys::from_config(&config.auth)?;
    let policy = ClaimsPolicy::from_config(&config.auth);

    let encoder = Arc::new(JwtEncoder::new(keys.clone(), policy, clock.clone()));
    let full_verifier = Arc::new(JwtDecoder::new(keys.clone(), policy, clock.clone()));
    let edge_verifier = Arc::new(EdgeDecoder::new(keys, policy, clock.clone()));

    let hasher = Arc::new(PasswordHasher::new(&config.auth.password_hash)?);
    let sessions = Arc::new(SessionStore::new(
        cache.clone(),
        config.session.clone(),
        clock.clone(),
    ));
    let limiter = Arc::new(RateLimiter::new(
        cache.clone(),
        config.rate_limit.clone(),
        clock.clone(),
    ));

    let session_manager = Arc::new(SessionManager::new(
        credentials,
        sessions,
        hasher,
        encoder,
        full_verifier,
        limiter,
        SessionManager::lockout_policy(&config.auth),
        clock,
    ));

    info!(
        access_ttl = config.auth.access_ttl_seconds,
        refresh_ttl = config.auth.refresh_ttl_seconds,
        session_ttl = config.session.ttl_seconds,
        "Auth components initialized"
    );

    Ok(AppState {
        cookies: Arc::new(AuthCookies::from_config(&config)),
        config,
        cache,
        session_manager,
        edge_verifier,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server);

    let app = build_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}
