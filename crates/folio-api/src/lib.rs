//! # folio-api
//!
//! HTTP surface of the Folio auth core, built on Axum.
//!
//! Exposes the sign-in, refresh, sign-out, and session management
//! endpoints, the cookie contract, the request gate that edge-verifies
//! access tokens, and the mapping from `AppError` to HTTP responses.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
