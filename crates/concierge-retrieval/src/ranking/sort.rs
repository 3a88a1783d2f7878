//! Caller-requested orderings applied on top of the composite order.
//!
//! Sorts are stable, so equal keys keep the composite total order.

use std::cmp::Ordering;

use concierge_core::models::{RankedResult, SortMode};

use super::RankingContext;

pub fn apply(results: &mut [RankedResult], mode: SortMode, ctx: &RankingContext) {
    match mode {
        SortMode::BestMatch => {}
        SortMode::RatingHigh => {
            results.sort_by(|a, b| desc(a.candidate.metadata.rating, b.candidate.metadata.rating));
        }
        SortMode::PriceLow => {
            results.sort_by(|a, b| {
                asc(
                    a.candidate.metadata.price_tier().map(f64::from),
                    b.candidate.metadata.price_tier().map(f64::from),
                )
            });
        }
        SortMode::Distance => {
            let Some(origin) = ctx.reference_location else {
                return;
            };
            let km = |r: &RankedResult| {
                r.candidate
                    .metadata
                    .coordinates
                    .map(|c| origin.distance_km(&c))
            };
            results.sort_by(|a, b| asc(km(a), km(b)));
        }
    }
}

/// Ascending with missing values last.
fn asc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending with missing values last.
fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
