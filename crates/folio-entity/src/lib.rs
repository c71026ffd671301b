//! # folio-entity
//!
//! Domain records for the Folio auth core: the principal (credential store
//! row) consumed by the login flow, and the session record owned by the
//! session store.

pub mod session;
pub mod user;
