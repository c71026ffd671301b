//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use folio_auth::{SessionManager, TokenVerifier};
use folio_cache::CacheManager;
use folio_core::config::AppConfig;

use crate::cookies::AuthCookies;

/// Application state passed to every handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Session and rate-limit store.
    pub cache: Arc<CacheManager>,
    /// Sign-in, refresh, sign-out, and session management flows.
    pub session_manager: Arc<SessionManager>,
    /// Signature-only verifier used by the request gate.
    pub edge_verifier: Arc<dyn TokenVerifier>,
    /// Cookie contract.
    pub cookies: Arc<AuthCookies>,
}
