//! Custom Axum extractors.

pub mod auth;
pub mod client;

pub use auth::AuthSession;
pub use client::ClientMeta;
