use std::cmp::Ordering;

use concierge_core::config::ConciergeConfig;
use concierge_core::models::{Coordinates, FactorWeights, PlaceCandidate, PlaceMetadata};
use concierge_retrieval::{RankingContext, RankingEngine};
use proptest::prelude::*;

fn arb_candidate(id: usize) -> impl Strategy<Value = PlaceCandidate> {
    (
        prop_oneof![Just(f64::NAN), -1.0f64..1.0],
        proptest::option::of(0.0f64..5.0),
        proptest::option::of(0u32..5000),
        proptest::option::of(1u8..=4),
        proptest::option::of((30.0f64..30.5, -98.0f64..-97.5)),
    )
        .prop_map(move |(similarity, rating, reviews, tier, coords)| {
            PlaceCandidate::new(
                format!("p{id:03}"),
                similarity,
                PlaceMetadata {
                    name: format!("Place {id}"),
                    rating,
                    review_count: reviews,
                    price_tier: tier,
                    coordinates: coords.map(|(lat, lon)| Coordinates::new(lat, lon)),
                    ..PlaceMetadata::default()
                },
            )
        })
}

fn arb_batch() -> impl Strategy<Value = Vec<PlaceCandidate>> {
    (1usize..25).prop_flat_map(|n| (0..n).map(arb_candidate).collect::<Vec<_>>())
}

fn engine() -> RankingEngine {
    RankingEngine::new(ConciergeConfig::default().ranking)
}

fn ctx(with_location: bool) -> RankingContext {
    RankingContext {
        reference_location: with_location.then(|| Coordinates::new(30.2672, -97.7431)),
        ..RankingContext::default()
    }
}

// ── Determinism and total order ─────────────────────────────────────────────

proptest! {
    #[test]
    fn rank_is_deterministic(batch in arb_batch(), located in any::<bool>()) {
        let first = engine().rank(&batch, &ctx(located), &FactorWeights::default());
        let second = engine().rank(&batch, &ctx(located), &FactorWeights::default());
        prop_assert_eq!(
            first.iter().map(|r| r.id().to_string()).collect::<Vec<_>>(),
            second.iter().map(|r| r.id().to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn rank_output_is_sorted_by_total_order(batch in arb_batch(), located in any::<bool>()) {
        let results = engine().rank(&batch, &ctx(located), &FactorWeights::default());
        prop_assert_eq!(results.len(), batch.len());
        for pair in results.windows(2) {
            prop_assert_ne!(pair[0].total_cmp(&pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn rank_ignores_input_order(batch in arb_batch()) {
        let mut reversed = batch.clone();
        reversed.reverse();
        let a = engine().rank(&batch, &ctx(true), &FactorWeights::default());
        let b = engine().rank(&reversed, &ctx(true), &FactorWeights::default());
        prop_assert_eq!(
            a.iter().map(|r| r.id().to_string()).collect::<Vec<_>>(),
            b.iter().map(|r| r.id().to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn composites_are_finite_and_bounded(batch in arb_batch(), located in any::<bool>()) {
        let results = engine().rank(&batch, &ctx(located), &FactorWeights::default());
        for r in &results {
            prop_assert!(r.composite.is_finite());
            prop_assert!(r.composite >= -1e-9 && r.composite <= 1.0 + 1e-9);
        }
    }
}
