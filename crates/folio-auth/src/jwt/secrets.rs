//! Versioned signing secrets.

use folio_core::config::{AuthConfig, SigningSecret};
use folio_core::error::AppError;
use folio_core::result::AppResult;

use super::claims::TokenKind;

/// The secrets for one token kind, ordered by version.
///
/// The newest version signs. Every version in the ring verifies, which is
/// what lets a secret be rotated without invalidating outstanding tokens.
#[derive(Clone)]
pub struct SecretRing {
    // Sorted ascending by version; never empty.
    secrets: Vec<(u32, Vec<u8>)>,
}

impl std::fmt::Debug for SecretRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let versions: Vec<u32> = self.secrets.iter().map(|(v, _)| *v).collect();
        f.debug_struct("SecretRing")
            .field("versions", &versions)
            .finish()
    }
}

impl SecretRing {
    /// Build a ring from configured secrets.
    pub fn new(secrets: &[SigningSecret]) -> AppResult<Self> {
        if secrets.is_empty() {
            return Err(AppError::configuration("Signing secret ring is empty"));
        }
        let mut secrets: Vec<(u32, Vec<u8>)> = secrets
            .iter()
            .map(|s| (s.version, s.secret.as_bytes().to_vec()))
            .collect();
        secrets.sort_by_key(|(version, _)| *version);
        Ok(Self { secrets })
    }

    /// Version and key used to sign new tokens.
    pub fn signing(&self) -> (u32, &[u8]) {
        // `new` guarantees at least one entry.
        let (version, key) = &self.secrets[self.secrets.len() - 1];
        (*version, key)
    }

    /// Key for a token's `v` claim; `None` selects the oldest version.
    pub fn resolve(&self, version: Option<u32>) -> Option<&[u8]> {
        match version {
            None => self.secrets.first().map(|(_, key)| key.as_slice()),
            Some(v) => self
                .secrets
                .iter()
                .find(|(candidate, _)| *candidate == v)
                .map(|(_, key)| key.as_slice()),
        }
    }

    /// All keys, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.secrets.iter().map(|(_, key)| key.as_slice())
    }
}

/// The access and refresh rings.
#[derive(Debug, Clone)]
pub struct TokenKeys {
    access: SecretRing,
    refresh: SecretRing,
}

impl TokenKeys {
    /// Rings from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            access: SecretRing::new(&config.access_secrets)?,
            refresh: SecretRing::new(&config.refresh_secrets)?,
        })
    }

    /// Rings built elsewhere.
    pub fn from_rings(access: SecretRing, refresh: SecretRing) -> Self {
        Self { access, refresh }
    }

    /// Ring for `kind`.
    pub fn ring(&self, kind: TokenKind) -> &SecretRing {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}
