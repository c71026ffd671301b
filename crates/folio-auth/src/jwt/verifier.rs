//! The verification seam shared by the request gate and server logic.

use super::claims::{Claims, TokenKind};

/// Verifies a token of a given kind.
///
/// Returns `None` for every kind of failure. Callers get no hint of why a
/// token was refused.
pub trait TokenVerifier: Send + Sync + std::fmt::Debug {
    /// Claims of `token` if it is a currently valid token of `kind`.
    fn verify(&self, kind: TokenKind, token: &str) -> Option<Claims>;
}
