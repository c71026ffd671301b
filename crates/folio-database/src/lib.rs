//! # folio-database
//!
//! PostgreSQL connection management, migrations, and the credential store
//! the login flow reads principals and lockout counters from.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{CredentialStore, FailedAttempt, MemoryCredentialStore, PgCredentialStore};
