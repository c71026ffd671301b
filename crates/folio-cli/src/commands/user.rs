//! Principal management commands.

use clap::{Args, Subcommand};
use validator::ValidateEmail;

use crate::output::{self, OutputFormat};
use folio_auth::{PasswordHasher, PasswordValidator};
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::{CredentialStore, PgCredentialStore};
use folio_entity::user::{NewPrincipal, UserRole};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a principal. Only one admin may exist.
    Create {
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Role: admin, editor, or viewer
        #[arg(short, long, default_value = "admin")]
        role: UserRole,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List all principals
    List,
    /// Lift a lockout
    Unlock {
        /// Email address
        email: String,
    },
}

fn prompt_err(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect_database(config).await?;
    let store = PgCredentialStore::new(db.pool().clone());

    match &args.command {
        UserCommand::Create {
            email,
            role,
            password,
        } => {
            let email = match email {
                Some(e) => e.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Email")
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            if !email.validate_email() {
                return Err(AppError::validation(format!("'{email}' is not a valid email")));
            }

            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(prompt_err)?,
            };
            PasswordValidator::new(&config.auth).validate(&password, &email)?;

            let hasher = PasswordHasher::new(&config.auth.password_hash)?;
            let principal = store
                .create(NewPrincipal {
                    email,
                    password_hash: hasher.hash_password(&password)?,
                    role: *role,
                })
                .await?;

            output::print_success(&format!(
                "Created {} '{}' (id: {})",
                principal.role, principal.email, principal.id
            ));
        }
        UserCommand::List => {
            let principals = store.list().await?;
            output::print_principals(&principals, format)?;
        }
        UserCommand::Unlock { email } => {
            let principal = store
                .find_by_email(email)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))?;

            if principal.lock_until.is_none() && principal.failed_login_attempts == 0 {
                output::print_warning(&format!("'{email}' is not locked"));
            } else {
                store.unlock(principal.id).await?;
                output::print_success(&format!("Unlocked '{email}'"));
            }
        }
    }

    db.close().await;
    Ok(())
}
