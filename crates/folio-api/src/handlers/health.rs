//! Health check handler.

use axum::Json;
use axum::extract::State;

use folio_core::traits::CacheProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.cache.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if cache { "ok" } else { "degraded" }.to_string(),
        cache,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
