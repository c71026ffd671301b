//! Schema migrations.

use sqlx::PgPool;
use tracing::info;

use folio_core::error::{AppError, ErrorKind};
use folio_core::result::AppResult;

/// Apply every pending migration under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to apply migrations", e))?;

    info!("Database schema is up to date");
    Ok(())
}
