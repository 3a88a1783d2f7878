use serde::{Deserialize, Serialize};

use crate::models::FactorWeights;

use super::defaults;

/// Ranking engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: FactorWeights,
    /// Sum the per-turn weights are renormalised to.
    pub weight_total: f64,
    /// Recency factor drop for places surfaced in the previous turn.
    pub recency_decay: f64,
    /// Distance (km) at which the proximity factor reaches 0.5.
    pub proximity_scale_km: f64,
    /// Added to a factor the caller emphasises ("best", "closest").
    pub emphasis_boost: f64,
    /// Added to the preference factor when a price or atmosphere is stated.
    pub preference_boost: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            weight_total: defaults::DEFAULT_WEIGHT_TOTAL,
            recency_decay: defaults::DEFAULT_RECENCY_DECAY,
            proximity_scale_km: defaults::DEFAULT_PROXIMITY_SCALE_KM,
            emphasis_boost: defaults::DEFAULT_EMPHASIS_BOOST,
            preference_boost: defaults::DEFAULT_PREFERENCE_BOOST,
        }
    }
}
