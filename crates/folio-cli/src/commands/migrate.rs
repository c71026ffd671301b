//! Database migration command.

use crate::output;
use folio_core::config::AppConfig;
use folio_core::error::AppError;

/// Apply every pending migration.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect_database(config).await?;

    println!("Running database migrations...");
    folio_database::migration::run_migrations(db.pool()).await?;
    output::print_success("All migrations applied successfully.");

    db.close().await;
    Ok(())
}
