//! # folio-auth
//!
//! Authentication and session core for Folio.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token issuance and the two verifier paths
//! - `password`: Argon2id password hashing and setup-time policy
//! - `session`: Redis-resident session store and the sign-in, refresh,
//!   and sign-out flows
//! - `rate_limit`: atomic fixed-window limiter for login attempts
//! - `error`: the fixed client-facing auth error set

pub mod error;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod session;

pub use jwt::{
    Claims, ClaimsPolicy, EdgeDecoder, JwtDecoder, JwtEncoder, TokenKind, TokenPair,
    TokenVerifier,
};
pub use password::{PasswordHasher, PasswordValidator};
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use session::{ClientInfo, Credentials, SessionManager, SessionStore, SignInResult};
