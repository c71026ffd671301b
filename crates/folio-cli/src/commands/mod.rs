//! CLI command definitions and dispatch.

pub mod migrate;
pub mod session;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use folio_cache::CacheManager;
use folio_core::clock::SystemClock;
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::DatabasePool;

/// Folio: setup and maintenance for the admin auth core
#[derive(Debug, Parser)]
#[command(name = "folio-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay to load (`config/<env>.toml`)
    #[arg(short, long, default_value = "development", env = "FOLIO_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Principal management
    User(user::UserArgs),
    /// Session inspection and revocation
    Session(session::SessionArgs),
    /// Apply database migrations
    Migrate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Session(args) => session::execute(args, &config, self.format).await,
            Commands::Migrate => migrate::execute(&config).await,
        }
    }
}

/// Helper: connect to the credential database
pub async fn connect_database(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: connect to the session store
pub async fn connect_cache(config: &AppConfig) -> Result<Arc<CacheManager>, AppError> {
    let cache = CacheManager::new(&config.cache, Arc::new(SystemClock)).await?;
    Ok(Arc::new(cache))
}
