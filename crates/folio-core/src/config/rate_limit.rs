//! Rate limiter configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Action name used by the login flow.
pub const LOGIN_ACTION: &str = "login";

/// Fixed-window limit for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    /// Attempts allowed per window.
    pub max_attempts: u64,
    /// Window length in seconds.
    pub window_seconds: u64,
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether limiting is enforced at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Rules keyed by action name.
    #[serde(default = "default_actions")]
    pub actions: HashMap<String, RateLimitRule>,
}

impl RateLimitConfig {
    /// Look up the rule for an action.
    pub fn rule(&self, action: &str) -> Option<RateLimitRule> {
        self.actions.get(action).copied()
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            actions: default_actions(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_actions() -> HashMap<String, RateLimitRule> {
    HashMap::from([(
        LOGIN_ACTION.to_string(),
        RateLimitRule {
            max_attempts: 5,
            window_seconds: 15 * 60,
        },
    )])
}
