use criterion::{black_box, criterion_group, criterion_main, Criterion};

use concierge_core::config::ConciergeConfig;
use concierge_core::models::{
    ConversationState, Coordinates, FactorWeights, PlaceCandidate, PlaceMetadata, SortMode,
};
use concierge_retrieval::{BuildOutcome, QueryBuilder, RankingContext, RankingEngine};

/// A batch the size of a default `top_k` search, spread over a few km.
fn build_batch(n: usize) -> Vec<PlaceCandidate> {
    (0..n)
        .map(|i| {
            let f = i as f64;
            PlaceCandidate::new(
                format!("p{i:04}"),
                1.0 - f / n as f64,
                PlaceMetadata {
                    name: format!("Place {i}"),
                    category: "restaurant".to_string(),
                    rating: (i % 5 != 0).then(|| 3.0 + (f % 20.0) / 10.0),
                    review_count: Some((i * 37 % 1000) as u32),
                    price_tier: Some((i % 4) as u8 + 1),
                    coordinates: Some(Coordinates::new(30.25 + f * 0.001, -97.75 + f * 0.0007)),
                    ..PlaceMetadata::default()
                },
            )
        })
        .collect()
}

fn bench_rank_15(c: &mut Criterion) {
    let engine = RankingEngine::new(ConciergeConfig::default().ranking);
    let batch = build_batch(15);
    let ctx = RankingContext {
        reference_location: Some(Coordinates::new(30.2672, -97.7431)),
        ..RankingContext::default()
    };
    let weights = FactorWeights::default();
    c.bench_function("rank_15_candidates", |b| {
        b.iter(|| engine.rank(black_box(&batch), black_box(&ctx), &weights))
    });
}

fn bench_rank_200_sorted(c: &mut Criterion) {
    let engine = RankingEngine::new(ConciergeConfig::default().ranking);
    let batch = build_batch(200);
    let ctx = RankingContext {
        reference_location: Some(Coordinates::new(30.2672, -97.7431)),
        ..RankingContext::default()
    };
    let weights = FactorWeights::default();
    c.bench_function("rank_200_candidates_distance_sort", |b| {
        b.iter(|| engine.rank_sorted(black_box(&batch), &ctx, &weights, SortMode::Distance))
    });
}

fn bench_build_and_rank(c: &mut Criterion) {
    let config = ConciergeConfig::default();
    let builder = QueryBuilder::new(&config);
    let engine = RankingEngine::new(config.ranking.clone());
    let mut state = ConversationState::new("bench");
    state.reference_location = Some(Coordinates::new(30.2672, -97.7431));
    let batch = build_batch(15);

    c.bench_function("build_query_and_rank", |b| {
        b.iter(|| {
            let BuildOutcome::Ready(query) =
                builder.build(black_box("find cheap Italian restaurants nearby"), &state)
            else {
                return Vec::new();
            };
            let ctx = RankingContext::from_turn(&state, &query);
            engine.rank(&batch, &ctx, &query.soft_weights)
        })
    });
}

criterion_group!(benches, bench_rank_15, bench_rank_200_sorted, bench_build_and_rank);
criterion_main!(benches);
