//! Per-factor scores in [0, 1].
//!
//! Each function returns one `Option<f64>` per candidate; `None` means the
//! candidate lacks the input and is imputed with the batch median.

use std::collections::HashMap;

use concierge_core::constants::{MAX_PRICE_TIER, MAX_RATING, MIN_PRICE_TIER};
use concierge_core::models::{PlaceCandidate, RankingFactor};

use super::RankingContext;

/// Raw factor columns for a batch. Inapplicable factors are absent.
pub type FactorColumns = HashMap<RankingFactor, Vec<Option<f64>>>;

pub fn columns(
    candidates: &[PlaceCandidate],
    ctx: &RankingContext,
    recency_decay: f64,
    proximity_scale_km: f64,
) -> FactorColumns {
    let mut columns = FactorColumns::new();
    columns.insert(RankingFactor::Similarity, similarity(candidates));
    columns.insert(RankingFactor::Rating, rating(candidates));
    columns.insert(RankingFactor::Recency, recency(candidates, ctx, recency_decay));
    if ctx.reference_location.is_some() {
        columns.insert(
            RankingFactor::Proximity,
            proximity(candidates, ctx, proximity_scale_km),
        );
    }
    if ctx.has_stated_preference() {
        columns.insert(RankingFactor::Preference, preference(candidates, ctx));
    }
    columns
}

/// Min-max normalised across the batch. All-equal batches score 1.0.
pub fn similarity(candidates: &[PlaceCandidate]) -> Vec<Option<f64>> {
    let finite: Vec<f64> = candidates
        .iter()
        .map(|c| c.similarity)
        .filter(|s| s.is_finite())
        .collect();
    let Some(min) = finite.iter().copied().reduce(f64::min) else {
        return vec![None; candidates.len()];
    };
    let max = finite.iter().copied().fold(min, f64::max);
    let span = max - min;

    candidates
        .iter()
        .map(|c| {
            let s = c.similarity;
            if !s.is_finite() {
                None
            } else if span <= f64::EPSILON {
                Some(1.0)
            } else {
                Some((s - min) / span)
            }
        })
        .collect()
}

pub fn rating(candidates: &[PlaceCandidate]) -> Vec<Option<f64>> {
    candidates
        .iter()
        .map(|c| {
            c.metadata
                .rating
                .filter(|r| r.is_finite())
                .map(|r| (r / MAX_RATING).clamp(0.0, 1.0))
        })
        .collect()
}

/// `1 / (1 + km / scale)`.
pub fn proximity(
    candidates: &[PlaceCandidate],
    ctx: &RankingContext,
    scale_km: f64,
) -> Vec<Option<f64>> {
    let Some(origin) = ctx.reference_location else {
        return vec![None; candidates.len()];
    };
    candidates
        .iter()
        .map(|c| {
            c.metadata
                .coordinates
                .map(|coords| 1.0 / (1.0 + origin.distance_km(&coords) / scale_km))
        })
        .collect()
}

/// Places surfaced in the previous turn are decayed unless the caller asked
/// for more like them.
pub fn recency(candidates: &[PlaceCandidate], ctx: &RankingContext, decay: f64) -> Vec<Option<f64>> {
    candidates
        .iter()
        .map(|c| {
            if !ctx.more_like_that && ctx.surfaced.contains(&c.id) {
                Some((1.0 - decay).clamp(0.0, 1.0))
            } else {
                Some(1.0)
            }
        })
        .collect()
}

/// Mean of the stated-preference matches a candidate has data for.
pub fn preference(candidates: &[PlaceCandidate], ctx: &RankingContext) -> Vec<Option<f64>> {
    let tier_span = f64::from(MAX_PRICE_TIER - MIN_PRICE_TIER);
    candidates
        .iter()
        .map(|c| {
            let mut parts = Vec::with_capacity(2);
            if let (Some(level), Some(tier)) = (ctx.price_level, c.metadata.price_tier()) {
                let distance = (f64::from(tier) - level.target_tier()).abs();
                parts.push((1.0 - distance / tier_span).clamp(0.0, 1.0));
            }
            if !ctx.atmosphere.is_empty() && !c.metadata.atmosphere.is_empty() {
                let present = ctx
                    .atmosphere
                    .iter()
                    .filter(|tag| c.metadata.has_atmosphere(tag))
                    .count();
                parts.push(present as f64 / ctx.atmosphere.len() as f64);
            }
            if parts.is_empty() {
                None
            } else {
                Some(parts.iter().sum::<f64>() / parts.len() as f64)
            }
        })
        .collect()
}

/// Median of the available values.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    Some(if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    })
}
