//! Restricted-runtime token verification.
//!
//! Parses and checks compact HS256 tokens with nothing but HMAC-SHA256 and
//! base64url, so it can run in the request gate without the full JWT stack.
//! Its accept/reject behavior must match [`super::JwtDecoder`] exactly; the
//! shared test suite runs against both.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use folio_core::clock::Clock;

use super::claims::{Claims, ClaimsPolicy, TokenKind};
use super::secrets::TokenKeys;
use super::verifier::TokenVerifier;

type HmacSha256 = Hmac<Sha256>;

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Lightweight verifier used by the request gate.
#[derive(Debug, Clone)]
pub struct EdgeDecoder {
    keys: TokenKeys,
    policy: ClaimsPolicy,
    clock: Arc<dyn Clock>,
}

impl EdgeDecoder {
    /// Creates a decoder.
    pub fn new(keys: TokenKeys, policy: ClaimsPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            policy,
            clock,
        }
    }

    fn check(&self, kind: TokenKind, token: &str) -> Option<Claims> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let header: Header =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_b64).ok()?).ok()?;
        if header.alg != "HS256" {
            return None;
        }

        let claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload_b64).ok()?).ok()?;
        let key = self.keys.ring(kind).resolve(claims.v)?;

        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
        let mut mac = HmacSha256::new_from_slice(key).ok()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        // Constant-time comparison.
        mac.verify_slice(&signature).ok()?;

        Some(claims)
    }
}

impl TokenVerifier for EdgeDecoder {
    fn verify(&self, kind: TokenKind, token: &str) -> Option<Claims> {
        let Some(claims) = self.check(kind, token) else {
            debug!(kind = kind.as_str(), "Token signature or structure rejected");
            return None;
        };

        if !self.policy.accepts(kind, &claims, self.clock.now_seconds()) {
            debug!(kind = kind.as_str(), "Token outside its validity window");
            return None;
        }
        Some(claims)
    }
}
