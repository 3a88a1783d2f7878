//! RankingEngine: factor columns → median imputation → weight
//! redistribution → composite → total order → optional sort mode.

pub mod factors;
pub mod sort;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use concierge_core::config::RankingConfig;
use concierge_core::models::{
    ConversationState, Coordinates, FactorWeights, FilterKind, FilterValue, PlaceCandidate,
    PlaceId, PriceLevel, RankedResult, RankingFactor, SortMode, StructuredQuery,
};
use tracing::debug;

/// Per-turn inputs to ranking that come from conversation state and the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingContext {
    pub reference_location: Option<Coordinates>,
    /// Places surfaced by the previous turn.
    pub surfaced: HashSet<PlaceId>,
    pub more_like_that: bool,
    pub price_level: Option<PriceLevel>,
    pub atmosphere: BTreeSet<String>,
}

impl RankingContext {
    pub fn from_turn(state: &ConversationState, query: &StructuredQuery) -> Self {
        Self {
            reference_location: state.reference_location,
            surfaced: state.surfaced_ids().into_iter().collect(),
            more_like_that: query.more_like_that,
            price_level: query.filters.price_level(),
            atmosphere: query
                .filters
                .get(FilterKind::Atmosphere)
                .and_then(FilterValue::as_tags)
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub fn has_stated_preference(&self) -> bool {
        self.price_level.is_some() || !self.atmosphere.is_empty()
    }
}

/// Multi-factor re-scorer. Deterministic: equal inputs give equal output.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Rank in composite order.
    pub fn rank(
        &self,
        candidates: &[PlaceCandidate],
        ctx: &RankingContext,
        weights: &FactorWeights,
    ) -> Vec<RankedResult> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut columns = factors::columns(
            candidates,
            ctx,
            self.config.recency_decay,
            self.config.proximity_scale_km,
        );

        // Factors with no input for any candidate are dropped; the rest are
        // imputed with their batch median.
        let mut active = Vec::with_capacity(RankingFactor::COUNT);
        for factor in RankingFactor::ALL {
            let Some(column) = columns.get_mut(&factor) else {
                continue;
            };
            let Some(median) = factors::median(column) else {
                continue;
            };
            for value in column.iter_mut() {
                value.get_or_insert(median);
            }
            active.push(factor);
        }
        let effective = weights.redistributed(&active);

        let mut results: Vec<RankedResult> = candidates
            .iter()
            .enumerate()
            .map(|(i, candidate)| {
                let mut breakdown = BTreeMap::new();
                let mut composite = 0.0;
                for factor in &active {
                    let value = columns
                        .get(factor)
                        .and_then(|col| col[i])
                        .unwrap_or(0.0);
                    let contribution = effective.get(*factor) * value;
                    breakdown.insert(*factor, contribution);
                    composite += contribution;
                }
                RankedResult {
                    candidate: candidate.clone(),
                    composite,
                    breakdown,
                }
            })
            .collect();

        results.sort_by(RankedResult::total_cmp);

        debug!(
            candidates = candidates.len(),
            active = ?active,
            top = results.first().map(|r| r.candidate.id.as_str()),
            "ranked candidates"
        );
        results
    }

    /// Rank, then apply the requested sort mode.
    pub fn rank_sorted(
        &self,
        candidates: &[PlaceCandidate],
        ctx: &RankingContext,
        weights: &FactorWeights,
        mode: SortMode,
    ) -> Vec<RankedResult> {
        let mut results = self.rank(candidates, ctx, weights);
        sort::apply(&mut results, mode, ctx);
        results
    }
}
