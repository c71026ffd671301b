//! Session records and the sign-in, refresh, and sign-out flows.

pub mod manager;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use manager::{Credentials, SessionManager, SignInResult};
pub use store::{ClientInfo, SessionStore};
