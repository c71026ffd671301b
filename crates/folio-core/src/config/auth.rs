//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Prefix of the development placeholder secrets; refused in production.
pub const PLACEHOLDER_SECRET_PREFIX: &str = "CHANGE_ME";

/// One versioned HMAC signing secret.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningSecret {
    /// Version number carried in the token's `v` claim.
    pub version: u32,
    /// Raw secret material.
    pub secret: String,
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("version", &self.version)
            .field("secret", &"****")
            .finish()
    }
}

/// `SameSite` attribute for auth cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    /// `SameSite=Strict`.
    Strict,
    /// `SameSite=Lax`.
    #[default]
    Lax,
}

/// Cookie contract settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Name of the access token cookie.
    #[serde(default = "default_access_cookie")]
    pub access_name: String,
    /// Name of the refresh token cookie.
    #[serde(default = "default_refresh_cookie")]
    pub refresh_name: String,
    /// Force the `Secure` flag; production always sets it.
    #[serde(default)]
    pub secure: bool,
    /// `SameSite` policy.
    #[serde(default)]
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_name: default_access_cookie(),
            refresh_name: default_refresh_cookie(),
            secure: false,
            same_site: SameSitePolicy::default(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing secrets for access tokens, newest version signs.
    #[serde(default = "default_access_secrets")]
    pub access_secrets: Vec<SigningSecret>,
    /// Signing secrets for refresh tokens, newest version signs.
    #[serde(default = "default_refresh_secrets")]
    pub refresh_secrets: Vec<SigningSecret>,
    /// Access token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    /// Refresh token TTL in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_seconds: u64,
    /// Consecutive failed logins before the account locks.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i32,
    /// Account lockout duration in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
    /// Minimum password length for new principals.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 cost parameters.
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
    /// Cookie settings.
    #[serde(default)]
    pub cookies: CookieConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secrets: default_access_secrets(),
            refresh_secrets: default_refresh_secrets(),
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_seconds: default_refresh_ttl(),
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout(),
            password_min_length: default_password_min(),
            password_hash: PasswordHashConfig::default(),
            cookies: CookieConfig::default(),
        }
    }
}

fn default_access_secrets() -> Vec<SigningSecret> {
    vec![SigningSecret {
        version: 1,
        secret: format!("{PLACEHOLDER_SECRET_PREFIX}_ACCESS_SECRET_IN_PRODUCTION"),
    }]
}

fn default_refresh_secrets() -> Vec<SigningSecret> {
    vec![SigningSecret {
        version: 1,
        secret: format!("{PLACEHOLDER_SECRET_PREFIX}_REFRESH_SECRET_IN_PRODUCTION"),
    }]
}

fn default_access_ttl() -> u64 {
    15 * 60
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_max_failed() -> i32 {
    5
}

fn default_lockout() -> u64 {
    30
}

fn default_password_min() -> usize {
    12
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_access_cookie() -> String {
    "access_token".to_string()
}

fn default_refresh_cookie() -> String {
    "refresh_token".to_string()
}
