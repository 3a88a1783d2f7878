//! VectorRetrievalAdapter tests against the fixture backend: post-filtering,
//! bounded retries, timeouts and the broadening ladder.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use concierge_core::config::RetrievalConfig;
use concierge_core::errors::{ConciergeError, RetrievalError};
use concierge_core::models::{
    FactorWeights, FilterKind, FilterSet, FilterValue, PriceLevel, SortMode, StructuredQuery,
};
use concierge_core::traits::IVectorStore;
use concierge_core::UtteranceIntent;
use concierge_retrieval::{broaden, BroadeningStep, VectorRetrievalAdapter};
use test_fixtures::FixtureVectorStore;

const NOON: u16 = 12 * 60;

fn query(text: &str, filters: FilterSet) -> StructuredQuery {
    StructuredQuery {
        embedding_text: text.to_string(),
        expansion_terms: Vec::new(),
        filters,
        soft_weights: FactorWeights::default(),
        intent: UtteranceIntent::NewTopic,
        pinned: None,
        sort: SortMode::BestMatch,
        more_like_that: false,
        dropped_filters: Vec::new(),
    }
}

fn fast_config() -> RetrievalConfig {
    RetrievalConfig {
        timeout_ms: 500,
        max_attempts: 3,
        backoff_base_ms: 1,
        ..RetrievalConfig::default()
    }
}

fn adapter(store: Arc<FixtureVectorStore>, config: RetrievalConfig) -> VectorRetrievalAdapter {
    VectorRetrievalAdapter::new(store, config).at_minute_of_day(NOON)
}

fn cheap_open_italian() -> FilterSet {
    FilterSet::new()
        .with(FilterKind::Category, FilterValue::text("italian"))
        .with(FilterKind::PriceLevel, FilterValue::Price(PriceLevel::Low))
        .with(FilterKind::OpenNow, FilterValue::Flag(true))
}

fn id_set(candidates: &[concierge_core::PlaceCandidate]) -> HashSet<&str> {
    candidates.iter().map(|c| c.id.as_str()).collect()
}

#[tokio::test]
async fn returns_similarity_ranked_candidates() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    let results = adapter(store.clone(), fast_config())
        .search(&query("brisket ribs bbq", FilterSet::new()), 5)
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(results[0].id, "atx-010");
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn post_filters_when_backend_cannot_filter() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    assert!(!store.supports_filtering());
    let results = adapter(store, fast_config())
        .search(&query("italian", cheap_open_italian()), 30)
        .await
        .unwrap();

    assert_eq!(
        id_set(&results),
        HashSet::from(["atx-001", "atx-002", "atx-005", "sea-001", "chi-001"])
    );
}

#[tokio::test]
async fn server_side_filtering_gives_same_result() {
    let store = Arc::new(FixtureVectorStore::from_catalog().with_server_side_filtering(NOON));
    let filters = cheap_open_italian().with(FilterKind::City, FilterValue::text("austin"));
    let results = adapter(store, fast_config())
        .search(&query("italian", filters), 30)
        .await
        .unwrap();

    assert_eq!(id_set(&results), HashSet::from(["atx-001", "atx-002", "atx-005"]));
}

#[tokio::test]
async fn soft_filters_do_not_exclude() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    let filters = FilterSet::new()
        .with(FilterKind::Category, FilterValue::text("italian"))
        .with(FilterKind::Atmosphere, FilterValue::tags(["rooftop"]))
        .with(FilterKind::Landmark, FilterValue::text("river"));
    let results = adapter(store, fast_config())
        .search(&query("italian", filters), 30)
        .await
        .unwrap();

    assert_eq!(results.len(), 7);
}

#[tokio::test]
async fn pinned_place_narrows_to_one() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    let filters = FilterSet::new().with(FilterKind::PinnedPlace, FilterValue::Text("atx-008".into()));
    let results = adapter(store, fast_config())
        .search(&query("sushi", filters), 30)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "atx-008");
}

#[tokio::test]
async fn no_match_is_empty_not_error() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    let filters = FilterSet::new().with(FilterKind::City, FilterValue::text("boston"));
    let results = adapter(store, fast_config())
        .search(&query("pizza", filters), 10)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn non_finite_scores_are_dropped() {
    let store = Arc::new(FixtureVectorStore::from_catalog().with_score("atx-002", f64::NAN));
    let results = adapter(store, fast_config())
        .search(&query("pizza", FilterSet::new()), 30)
        .await
        .unwrap();
    assert!(results.iter().all(|c| c.similarity.is_finite()));
    assert!(!id_set(&results).contains("atx-002"));
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    store.fail_next(1);
    let results = adapter(store.clone(), fast_config())
        .search(&query("pizza", FilterSet::new()), 5)
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn exhausted_retries_report_backend_unavailable() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    store.fail_next(10);
    let err = adapter(store.clone(), fast_config())
        .search(&query("pizza", FilterSet::new()), 5)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConciergeError::RetrievalError(RetrievalError::BackendUnavailable { attempts: 3, .. })
    ));
    assert!(err.is_recoverable());
    assert_eq!(store.calls(), 3);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let store = Arc::new(FixtureVectorStore::from_catalog().with_latency(Duration::from_millis(300)));
    let config = RetrievalConfig {
        timeout_ms: 20,
        max_attempts: 2,
        backoff_base_ms: 1,
        ..RetrievalConfig::default()
    };
    let err = adapter(store, config)
        .search(&query("pizza", FilterSet::new()), 5)
        .await
        .unwrap_err();

    match err {
        ConciergeError::RetrievalError(e @ RetrievalError::BackendUnavailable { .. }) => {
            assert!(e.is_backend_unavailable());
            assert!(e.to_string().contains("timed out"));
        }
        other => panic!("expected BackendUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_top_k_is_rejected_without_calling_backend() {
    let store = Arc::new(FixtureVectorStore::from_catalog());
    let adapter = adapter(store.clone(), fast_config());
    for top_k in [0, 10_000] {
        let err = adapter
            .search(&query("pizza", FilterSet::new()), top_k)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConciergeError::RetrievalError(RetrievalError::InvalidTopK { .. })
        ));
    }
    assert_eq!(store.calls(), 0);
}

// ---------------------------------------------------------------------------
// Broadening
// ---------------------------------------------------------------------------

#[test]
fn broadening_ladder_relaxes_in_order() {
    let filters = cheap_open_italian()
        .with(FilterKind::MinRating, FilterValue::at_least(4.0))
        .with(FilterKind::City, FilterValue::text("austin"));
    let ladder = broaden(&filters);

    let steps: Vec<BroadeningStep> = ladder.iter().map(|(s, _)| *s).collect();
    assert_eq!(
        steps,
        vec![
            BroadeningStep::RelaxQualifiers,
            BroadeningStep::DropPrice,
            BroadeningStep::DropCategory,
        ]
    );

    let (_, relaxed) = &ladder[0];
    assert!(!relaxed.contains(FilterKind::OpenNow));
    assert!(!relaxed.contains(FilterKind::MinRating));
    assert!(relaxed.contains(FilterKind::PriceLevel));

    let (_, last) = ladder.last().unwrap();
    assert_eq!(last.kinds(), vec![FilterKind::City]);
}

#[test]
fn broadening_skips_steps_that_change_nothing() {
    let filters = FilterSet::new()
        .with(FilterKind::Category, FilterValue::text("italian"))
        .with(FilterKind::City, FilterValue::text("austin"));
    let steps: Vec<BroadeningStep> = broaden(&filters).into_iter().map(|(s, _)| s).collect();
    assert_eq!(steps, vec![BroadeningStep::DropCategory]);
}

#[test]
fn nothing_to_broaden_without_filters() {
    assert!(broaden(&FilterSet::new()).is_empty());
}
