//! Access and refresh token issuance and verification.
//!
//! Tokens are HS256 JWTs. Access and refresh tokens are signed from
//! separate secret rings, so a token of one kind never verifies as the
//! other. Two verifiers implement [`TokenVerifier`] with identical
//! semantics: [`JwtDecoder`] on top of `jsonwebtoken`, and [`EdgeDecoder`],
//! a dependency-light HMAC check used by the request gate.

pub mod claims;
pub mod decoder;
pub mod edge;
pub mod encoder;
pub mod secrets;
pub mod verifier;

pub use claims::{Claims, ClaimsPolicy, TokenKind, TokenSubject};
pub use decoder::JwtDecoder;
pub use edge::EdgeDecoder;
pub use encoder::{IssuedToken, JwtEncoder, TokenPair};
pub use secrets::{SecretRing, TokenKeys};
pub use verifier::TokenVerifier;
