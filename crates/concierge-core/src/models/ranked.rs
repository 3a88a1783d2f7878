use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

use super::place::PlaceCandidate;

/// Scoring dimensions combined into the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingFactor {
    Similarity,
    Rating,
    Proximity,
    Recency,
    Preference,
}

impl RankingFactor {
    pub const COUNT: usize = 5;

    pub const ALL: [RankingFactor; 5] = [
        Self::Similarity,
        Self::Rating,
        Self::Proximity,
        Self::Recency,
        Self::Preference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Similarity => "similarity",
            Self::Rating => "rating",
            Self::Proximity => "proximity",
            Self::Recency => "recency",
            Self::Preference => "preference",
        }
    }
}

/// Per-factor weights for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub similarity: f64,
    pub rating: f64,
    pub proximity: f64,
    pub recency: f64,
    pub preference: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            similarity: 0.5,
            rating: 0.2,
            proximity: 0.2,
            recency: 0.1,
            preference: 0.0,
        }
    }
}

impl FactorWeights {
    pub fn get(&self, factor: RankingFactor) -> f64 {
        match factor {
            RankingFactor::Similarity => self.similarity,
            RankingFactor::Rating => self.rating,
            RankingFactor::Proximity => self.proximity,
            RankingFactor::Recency => self.recency,
            RankingFactor::Preference => self.preference,
        }
    }

    pub fn set(&mut self, factor: RankingFactor, weight: f64) {
        let slot = match factor {
            RankingFactor::Similarity => &mut self.similarity,
            RankingFactor::Rating => &mut self.rating,
            RankingFactor::Proximity => &mut self.proximity,
            RankingFactor::Recency => &mut self.recency,
            RankingFactor::Preference => &mut self.preference,
        };
        *slot = weight;
    }

    pub fn total(&self) -> f64 {
        RankingFactor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Every weight must be finite and within [0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for factor in RankingFactor::ALL {
            let w = self.get(factor);
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(ConfigError::InvalidValue {
                    field: format!("ranking.weights.{}", factor.as_str()),
                    reason: format!("weight {w} outside [0, 1]"),
                });
            }
        }
        Ok(())
    }

    /// Scale every weight so they sum to `target`. All-zero weights stay zero.
    pub fn renormalized(&self, target: f64) -> Self {
        let total = self.total();
        if total <= f64::EPSILON {
            return *self;
        }
        let mut out = *self;
        for factor in RankingFactor::ALL {
            out.set(factor, self.get(factor) / total * target);
        }
        out
    }

    /// Zero the weights of inactive factors and hand their mass to the
    /// active ones, proportionally to the active weights.
    ///
    /// If every active factor has zero weight the mass is split evenly.
    pub fn redistributed(&self, active: &[RankingFactor]) -> Self {
        let total = self.total();
        let active_total: f64 = active.iter().map(|f| self.get(*f)).sum();

        let mut out = FactorWeights {
            similarity: 0.0,
            rating: 0.0,
            proximity: 0.0,
            recency: 0.0,
            preference: 0.0,
        };
        if active.is_empty() {
            return out;
        }
        for factor in active {
            let share = if active_total > f64::EPSILON {
                self.get(*factor) / active_total
            } else {
                1.0 / active.len() as f64
            };
            out.set(*factor, share * total);
        }
        out
    }
}

/// A candidate with its composite score and per-factor contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub candidate: PlaceCandidate,
    pub composite: f64,
    /// Factor → weighted contribution. Advisory only.
    pub breakdown: BTreeMap<RankingFactor, f64>,
}

impl RankedResult {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }

    pub fn name(&self) -> &str {
        &self.candidate.metadata.name
    }

    /// Total order: composite desc, review count desc, place id asc.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        other
            .composite
            .total_cmp(&self.composite)
            .then_with(|| other.candidate.review_count().cmp(&self.candidate.review_count()))
            .then_with(|| self.candidate.id.cmp(&other.candidate.id))
    }
}
