//! RankingEngine tests: factor scoring, weight redistribution, missing-value
//! imputation, total ordering and sort modes.

use concierge_core::config::ConciergeConfig;
use concierge_core::models::{
    ConversationState, Coordinates, FactorWeights, PlaceCandidate, RankingFactor, SortMode,
};
use concierge_retrieval::{BuildOutcome, QueryBuilder, RankingContext, RankingEngine};
use test_fixtures::place;

const DOWNTOWN: (f64, f64) = (30.2672, -97.7431);

fn engine() -> RankingEngine {
    RankingEngine::new(ConciergeConfig::default().ranking)
}

fn ids(results: &[concierge_core::RankedResult]) -> Vec<&str> {
    results.iter().map(|r| r.id()).collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn empty_batch_ranks_to_empty() {
    let results = engine().rank(&[], &RankingContext::default(), &FactorWeights::default());
    assert!(results.is_empty());
}

#[test]
fn cheap_italian_nearby_prefers_cheapest_strong_match() {
    let mut state = ConversationState::new("s-1");
    state.reference_location = Some(Coordinates::new(DOWNTOWN.0, DOWNTOWN.1));
    let BuildOutcome::Ready(query) =
        QueryBuilder::new(&ConciergeConfig::default()).build("find cheap Italian restaurants nearby", &state)
    else {
        panic!("expected a query");
    };

    let (lat, lon) = DOWNTOWN;
    let candidates = vec![
        place("a").similarity(0.90).price(3).rating(4.5).at(lat, lon).build(),
        place("b").similarity(0.85).price(1).rating(4.5).at(lat, lon).build(),
        place("c").similarity(0.80).price(2).rating(4.5).at(lat, lon).build(),
        place("d").similarity(0.30).price(1).rating(4.5).at(lat, lon).build(),
        place("e").similarity(0.20).price(1).rating(4.5).at(lat, lon).build(),
    ];
    let ctx = RankingContext::from_turn(&state, &query);
    let results = engine().rank(&candidates, &ctx, &query.soft_weights);

    assert!(results[0].breakdown.contains_key(&RankingFactor::Proximity));
    assert!(results[0].breakdown.contains_key(&RankingFactor::Preference));

    let median = 0.80;
    let cheapest_above_median = candidates
        .iter()
        .filter(|c| c.similarity > median)
        .filter_map(|c| c.metadata.price_tier)
        .min()
        .unwrap();
    assert_eq!(
        results[0].candidate.metadata.price_tier,
        Some(cheapest_above_median)
    );
    assert_eq!(results[0].id(), "b");
}

#[test]
fn proximity_is_omitted_without_reference_location() {
    let candidates = vec![place("a").similarity(0.9).rating(4.0).at(DOWNTOWN.0, DOWNTOWN.1).build()];
    let results = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    assert!(!results[0].breakdown.contains_key(&RankingFactor::Proximity));
    assert!(!results[0].breakdown.contains_key(&RankingFactor::Preference));
}

#[test]
fn omitted_weight_is_redistributed() {
    // A single perfect candidate scores the full weight total.
    let candidates = vec![place("solo").similarity(0.4).rating(5.0).build()];
    let results = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    assert!(approx(results[0].composite, 1.0));

    let contributions: f64 = results[0].breakdown.values().sum();
    assert!(approx(contributions, results[0].composite));
}

#[test]
fn equal_similarity_scores_full_marks() {
    let candidates = vec![
        place("a").similarity(0.7).build(),
        place("b").similarity(0.7).build(),
    ];
    let results = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    for r in &results {
        assert!(r.breakdown[&RankingFactor::Similarity] > 0.0);
    }
    assert!(approx(
        results[0].breakdown[&RankingFactor::Similarity],
        results[1].breakdown[&RankingFactor::Similarity]
    ));
}

#[test]
fn missing_rating_gets_batch_median() {
    let candidates = vec![
        place("a").similarity(0.5).rating(5.0).build(),
        place("b").similarity(0.5).rating(3.0).build(),
        place("c").similarity(0.5).build(),
    ];
    let results = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    let c = results.iter().find(|r| r.id() == "c").unwrap();

    // Active factors: similarity 0.5, rating 0.2, recency 0.1 → rating share 0.25.
    // Median rating 4.0 → 0.8 normalised.
    assert!(approx(c.breakdown[&RankingFactor::Rating], 0.25 * 0.8));
    assert_eq!(ids(&results), vec!["a", "c", "b"]);
}

#[test]
fn factor_with_no_data_is_dropped() {
    let mut ctx = RankingContext::default();
    ctx.reference_location = Some(Coordinates::new(DOWNTOWN.0, DOWNTOWN.1));
    let candidates = vec![
        place("a").similarity(0.9).build(),
        place("b").similarity(0.1).build(),
    ];
    let results = engine().rank(&candidates, &ctx, &FactorWeights::default());
    assert!(!results[0].breakdown.contains_key(&RankingFactor::Proximity));
    assert!(!results[0].breakdown.contains_key(&RankingFactor::Rating));
}

#[test]
fn non_finite_similarity_is_imputed() {
    let candidates = vec![
        place("a").similarity(0.9).build(),
        place("nan").similarity(f64::NAN).build(),
        place("b").similarity(0.1).build(),
    ];
    let results = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.composite.is_finite()));
    assert_eq!(ids(&results), vec!["a", "nan", "b"]);
}

#[test]
fn ties_break_on_review_count_then_id() {
    let candidates = vec![
        place("b").similarity(0.5).reviews(10).build(),
        place("c").similarity(0.5).reviews(50).build(),
        place("a").similarity(0.5).reviews(50).build(),
    ];
    let results = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    assert_eq!(ids(&results), vec!["a", "c", "b"]);
}

#[test]
fn previously_surfaced_places_decay() {
    let candidates = vec![
        place("seen").similarity(0.5).build(),
        place("fresh").similarity(0.5).build(),
    ];
    let mut ctx = RankingContext::default();
    ctx.surfaced.insert("seen".to_string());

    let results = engine().rank(&candidates, &ctx, &FactorWeights::default());
    assert_eq!(ids(&results), vec!["fresh", "seen"]);
    assert!(results[0].composite > results[1].composite);

    ctx.more_like_that = true;
    let results = engine().rank(&candidates, &ctx, &FactorWeights::default());
    assert!(approx(results[0].composite, results[1].composite));
}

#[test]
fn closer_places_rank_higher_when_location_known() {
    let mut ctx = RankingContext::default();
    ctx.reference_location = Some(Coordinates::new(DOWNTOWN.0, DOWNTOWN.1));
    let candidates = vec![
        place("far").similarity(0.5).at(30.40, -97.70).build(),
        place("near").similarity(0.5).at(30.2675, -97.7430).build(),
    ];
    let results = engine().rank(&candidates, &ctx, &FactorWeights::default());
    assert_eq!(ids(&results), vec!["near", "far"]);
}

#[test]
fn ranking_is_deterministic() {
    let candidates: Vec<PlaceCandidate> = (0..20)
        .map(|i| {
            place(&format!("p{i:02}"))
                .similarity(f64::from(i % 7) / 7.0)
                .rating(3.0 + f64::from(i % 3) * 0.5)
                .reviews(i * 3)
                .build()
        })
        .collect();
    let first = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    let second = engine().rank(&candidates, &RankingContext::default(), &FactorWeights::default());
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Sort modes
// ---------------------------------------------------------------------------

#[test]
fn rating_sort_puts_missing_last() {
    let candidates = vec![
        place("mid").similarity(0.9).rating(3.0).build(),
        place("none").similarity(0.8).build(),
        place("top").similarity(0.1).rating(4.9).build(),
    ];
    let results = engine().rank_sorted(
        &candidates,
        &RankingContext::default(),
        &FactorWeights::default(),
        SortMode::RatingHigh,
    );
    assert_eq!(ids(&results), vec!["top", "mid", "none"]);
}

#[test]
fn price_sort_is_ascending() {
    let candidates = vec![
        place("pricey").similarity(0.9).price(3).build(),
        place("unknown").similarity(0.8).build(),
        place("cheap").similarity(0.1).price(1).build(),
    ];
    let results = engine().rank_sorted(
        &candidates,
        &RankingContext::default(),
        &FactorWeights::default(),
        SortMode::PriceLow,
    );
    assert_eq!(ids(&results), vec!["cheap", "pricey", "unknown"]);
}

#[test]
fn distance_sort_without_location_keeps_composite_order() {
    let candidates = vec![
        place("low").similarity(0.1).at(30.0, -97.0).build(),
        place("high").similarity(0.9).at(31.0, -98.0).build(),
    ];
    let results = engine().rank_sorted(
        &candidates,
        &RankingContext::default(),
        &FactorWeights::default(),
        SortMode::Distance,
    );
    assert_eq!(ids(&results), vec!["high", "low"]);
}

#[test]
fn distance_sort_orders_by_km() {
    let mut ctx = RankingContext::default();
    ctx.reference_location = Some(Coordinates::new(DOWNTOWN.0, DOWNTOWN.1));
    let candidates = vec![
        place("far").similarity(0.9).at(30.50, -97.70).build(),
        place("mid").similarity(0.5).at(30.30, -97.74).build(),
        place("near").similarity(0.1).at(30.268, -97.743).build(),
    ];
    let results = engine().rank_sorted(&candidates, &ctx, &FactorWeights::default(), SortMode::Distance);
    assert_eq!(ids(&results), vec!["near", "mid", "far"]);
}
