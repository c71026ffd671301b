//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// How much longer than a session the per-user index lives, in seconds.
    #[serde(default = "default_index_grace")]
    pub index_grace_seconds: u64,
    /// Fraction of the lifetime that must have elapsed before `extend`
    /// actually renews a session.
    #[serde(default = "default_renew_threshold")]
    pub renew_threshold: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            index_grace_seconds: default_index_grace(),
            renew_threshold: default_renew_threshold(),
        }
    }
}

fn default_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_index_grace() -> u64 {
    24 * 60 * 60
}

fn default_renew_threshold() -> f64 {
    0.5
}
