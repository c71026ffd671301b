//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod logging;
pub mod rate_limit;
pub mod session;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use self::app::{Environment, ServerConfig};
pub use self::auth::{AuthConfig, CookieConfig, PasswordHashConfig, SameSitePolicy, SigningSecret};
pub use self::cache::{CacheConfig, RedisCacheConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::rate_limit::{LOGIN_ACTION, RateLimitConfig, RateLimitRule};
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Minimum accepted length of a signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session/rate-limit store settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token, password, and cookie settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Rate limiter rules.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `FOLIO__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Check cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_ring("access", &self.auth.access_secrets)?;
        validate_ring("refresh", &self.auth.refresh_secrets)?;

        let access: HashSet<&str> = self
            .auth
            .access_secrets
            .iter()
            .map(|s| s.secret.as_str())
            .collect();
        if self
            .auth
            .refresh_secrets
            .iter()
            .any(|s| access.contains(s.secret.as_str()))
        {
            return Err(AppError::configuration(
                "Access and refresh tokens must use distinct signing secrets",
            ));
        }

        if self.server.environment == Environment::Production {
            let placeholder = self
                .auth
                .access_secrets
                .iter()
                .chain(self.auth.refresh_secrets.iter())
                .any(|s| s.secret.starts_with(auth::PLACEHOLDER_SECRET_PREFIX));
            if placeholder {
                return Err(AppError::configuration(
                    "Placeholder signing secrets are not allowed in production",
                ));
            }
        }

        if self.auth.access_ttl_seconds == 0 || self.auth.refresh_ttl_seconds == 0 {
            return Err(AppError::configuration("Token TTLs must be positive"));
        }

        if !(0.0..=1.0).contains(&self.session.renew_threshold) {
            return Err(AppError::configuration(
                "session.renew_threshold must be between 0 and 1",
            ));
        }

        for (action, rule) in &self.rate_limit.actions {
            if rule.max_attempts == 0 || rule.window_seconds == 0 {
                return Err(AppError::configuration(format!(
                    "Rate limit rule '{action}' needs positive max_attempts and window_seconds"
                )));
            }
        }

        Ok(())
    }

    /// Whether cookies and other production-only hardening should apply.
    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }
}

fn validate_ring(name: &str, ring: &[SigningSecret]) -> Result<(), AppError> {
    if ring.is_empty() {
        return Err(AppError::configuration(format!(
            "auth.{name}_secrets must contain at least one secret"
        )));
    }

    let mut versions = HashSet::new();
    for secret in ring {
        if secret.secret.len() < MIN_SECRET_BYTES {
            return Err(AppError::configuration(format!(
                "auth.{name}_secrets version {} is shorter than {MIN_SECRET_BYTES} bytes",
                secret.version
            )));
        }
        if !versions.insert(secret.version) {
            return Err(AppError::configuration(format!(
                "auth.{name}_secrets has duplicate version {}",
                secret.version
            )));
        }
    }

    Ok(())
}
