use serde::{Deserialize, Serialize};

use super::defaults;

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when `CONCIERGE_LOG` is unset: "trace", "debug", "info", "warn", "error".
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
    /// Entries kept in the in-memory turn log.
    pub turn_log_capacity: usize,
    /// Degradation records kept; the oldest recovered ones are evicted first.
    pub degradation_history: usize,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json_logs: defaults::DEFAULT_JSON_LOGS,
            turn_log_capacity: defaults::DEFAULT_TURN_LOG_CAPACITY,
            degradation_history: defaults::DEFAULT_DEGRADATION_HISTORY,
        }
    }
}
