//! Full token verification on top of `jsonwebtoken`.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use folio_core::clock::Clock;

use super::claims::{Claims, ClaimsPolicy, TokenKind};
use super::secrets::TokenKeys;
use super::verifier::TokenVerifier;

/// Authoritative verifier used by server-side flows.
#[derive(Debug, Clone)]
pub struct JwtDecoder {
    keys: TokenKeys,
    policy: ClaimsPolicy,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtDecoder {
    /// Creates a decoder.
    pub fn new(keys: TokenKeys, policy: ClaimsPolicy, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Time checks belong to `ClaimsPolicy` and the injected clock; the
        // closed `Claims` type refuses `aud`/`iss`/`nbf`, exactly as the edge
        // verifier does.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            keys,
            policy,
            validation,
            clock,
        }
    }
}

impl TokenVerifier for JwtDecoder {
    fn verify(&self, kind: TokenKind, token: &str) -> Option<Claims> {
        let ring = self.keys.ring(kind);

        // The signing key must be the one the `v` claim names.
        let claims = ring.keys().find_map(|key| {
            let data = decode::<Claims>(token, &DecodingKey::from_secret(key), &self.validation)
                .ok()?;
            (ring.resolve(data.claims.v) == Some(key)).then_some(data.claims)
        });

        let Some(claims) = claims else {
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
