//! Session inspection and revocation commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use folio_auth::SessionStore;
use folio_core::clock::SystemClock;
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::{CredentialStore, PgCredentialStore};
use folio_entity::user::Principal;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List live sessions of a principal
    List {
        /// Email address
        email: String,
    },
    /// Revoke one session, or every session of a principal
    Revoke {
        /// Session ID
        #[arg(long, conflicts_with = "email", required_unless_present = "email")]
        id: Option<String>,
        /// Revoke all sessions of this principal
        #[arg(long)]
        email: Option<String>,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

async fn find(credentials: &PgCredentialStore, email: &str) -> Result<Principal, AppError> {
    credentials
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect_database(config).await?;
    let credentials = PgCredentialStore::new(db.pool().clone());
    let cache = super::connect_cache(config).await?;
    let sessions = SessionStore::new(cache, config.session.clone(), Arc::new(SystemClock));

    match &args.command {
        SessionCommand::List { email } => {
            let principal = find(&credentials, email).await?;
            let live = sessions.list_for_user(principal.id).await;
            output::print_sessions(&live, format)?;
        }
        SessionCommand::Revoke { id: Some(id), .. } => {
            if sessions.delete(id).await {
                output::print_success("Session revoked");
            } else {
                output::print_warning("No such session");
            }
        }
        SessionCommand::Revoke {
            email: Some(email),
            force,
            ..
        } => {
            let principal = find(&credentials, email).await?;
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Sign '{email}' out everywhere?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let revoked = sessions.delete_all_for_user(principal.id).await?;
            output::print_revoked(&principal, revoked, format)?;
        }
        SessionCommand::Revoke { .. } => {
            return Err(AppError::validation("Pass --id or --email"));
        }
    }

    db.close().await;
    Ok(())
}
