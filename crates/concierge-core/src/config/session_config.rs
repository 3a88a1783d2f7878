use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Conversation state lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Turns kept in the history ring.
    pub history_depth: usize,
    /// Inactivity before a conversation is destroyed.
    pub timeout_secs: u64,
    /// Interval between expiry sweeps.
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_depth: defaults::DEFAULT_HISTORY_DEPTH,
            timeout_secs: defaults::DEFAULT_SESSION_TIMEOUT_SECS,
            sweep_interval_secs: defaults::DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}
