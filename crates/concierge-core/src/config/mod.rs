pub mod defaults;
mod dialogue_config;
mod observability_config;
mod ranking_config;
mod retrieval_config;
mod session_config;

pub use dialogue_config::DialogueConfig;
pub use observability_config::ObservabilityConfig;
pub use ranking_config::RankingConfig;
pub use retrieval_config::RetrievalConfig;
pub use session_config::SessionConfig;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_TOP_K;
use crate::errors::{ConciergeResult, ConfigError};

/// Top-level configuration aggregating every subsystem.
///
/// Every section is optional in TOML; missing keys take their defaults.
///
/// ```
/// use concierge_core::config::ConciergeConfig;
///
/// let config = ConciergeConfig::from_toml("[retrieval]\ntop_k = 20\n").unwrap();
/// assert_eq!(config.retrieval.top_k, 20);
/// assert_eq!(config.session.history_depth, 5);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConciergeConfig {
    pub retrieval: RetrievalConfig,
    pub ranking: RankingConfig,
    pub session: SessionConfig,
    pub dialogue: DialogueConfig,
    pub observability: ObservabilityConfig,
}

impl ConciergeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> ConciergeResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> ConciergeResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::Parse {
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.retrieval.top_k == 0 || self.retrieval.top_k > MAX_TOP_K {
            return Err(invalid("retrieval.top_k", "must be between 1 and 200"));
        }
        if self.retrieval.timeout_ms == 0 {
            return Err(invalid("retrieval.timeout_ms", "must be positive"));
        }
        if self.retrieval.max_attempts == 0 {
            return Err(invalid("retrieval.max_attempts", "must be positive"));
        }

        self.ranking.weights.validate()?;
        for (field, value) in [
            ("ranking.weight_total", self.ranking.weight_total),
            ("ranking.recency_decay", self.ranking.recency_decay),
            ("ranking.emphasis_boost", self.ranking.emphasis_boost),
            ("ranking.preference_boost", self.ranking.preference_boost),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be within [0, 1]"));
            }
        }
        if self.ranking.weight_total <= 0.0 {
            return Err(invalid("ranking.weight_total", "must be positive"));
        }
        if !(self.ranking.proximity_scale_km.is_finite() && self.ranking.proximity_scale_km > 0.0) {
            return Err(invalid("ranking.proximity_scale_km", "must be positive"));
        }

        if self.session.history_depth == 0 {
            return Err(invalid("session.history_depth", "must be positive"));
        }
        if self.session.timeout_secs == 0 {
            return Err(invalid("session.timeout_secs", "must be positive"));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(invalid("session.sweep_interval_secs", "must be positive"));
        }

        if self.dialogue.shortlist_size == 0 {
            return Err(invalid("dialogue.shortlist_size", "must be positive"));
        }
        if self.dialogue.chunk_chars < 20 {
            return Err(invalid("dialogue.chunk_chars", "must be at least 20"));
        }
        Ok(())
    }
}
