//! Credential store trait and its implementations.

pub mod credential;
pub mod memory;
pub mod user;

pub use credential::{CredentialStore, FailedAttempt};
pub use memory::MemoryCredentialStore;
pub use user::PgCredentialStore;
