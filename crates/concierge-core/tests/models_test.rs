use std::time::Duration;

use chrono::Utc;
use concierge_core::errors::SessionError;
use concierge_core::models::*;
use concierge_core::traits::{Cancellable, CancellationToken};
use concierge_core::UtteranceIntent;
use proptest::prelude::*;

fn place(id: &str, f: impl FnOnce(&mut PlaceMetadata)) -> PlaceCandidate {
    let mut meta = PlaceMetadata {
        name: id.to_uppercase(),
        category: "restaurant".into(),
        ..Default::default()
    };
    f(&mut meta);
    PlaceCandidate::new(id, 0.5, meta)
}

fn ranked(id: &str, composite: f64, reviews: u32) -> RankedResult {
    RankedResult {
        candidate: place(id, |m| m.review_count = Some(reviews)),
        composite,
        breakdown: Default::default(),
    }
}

// ── Places ──────────────────────────────────────────────────────────────────

#[test]
fn haversine_distance_is_roughly_correct() {
    // Union Square to Ferry Building, San Francisco: about 1.6 km.
    let union_square = Coordinates::new(37.7880, -122.4075);
    let ferry_building = Coordinates::new(37.7955, -122.3937);
    let km = union_square.distance_km(&ferry_building);
    assert!((1.3..1.7).contains(&km), "got {km}");
    assert_eq!(union_square.distance_km(&union_square), 0.0);
}

#[test]
fn opening_hours_handle_overnight_windows() {
    let bar = OpeningHours::new(18 * 60, 2 * 60);
    assert!(bar.is_open_at(23 * 60));
    assert!(bar.is_open_at(60));
    assert!(!bar.is_open_at(12 * 60));

    let cafe = OpeningHours::new(7 * 60, 15 * 60);
    assert!(cafe.is_open_at(7 * 60));
    assert!(!cafe.is_open_at(15 * 60));

    assert!(OpeningHours::always_open().is_open_at(0));
    assert!(OpeningHours::always_open().is_open_at(1439));
}

// ── Filters ─────────────────────────────────────────────────────────────────

#[test]
fn merge_overrides_same_kind_and_keeps_the_rest() {
    let mut active = FilterSet::new()
        .with(FilterKind::Category, FilterValue::text("italian"))
        .with(FilterKind::PriceLevel, FilterValue::Price(PriceLevel::Low));
    let newer = FilterSet::new().with(FilterKind::PriceLevel, FilterValue::Price(PriceLevel::High));

    active.merge(&newer);
    assert_eq!(active.price_level(), Some(PriceLevel::High));
    assert_eq!(active.category(), Some("italian"));
}

#[test]
fn only_city_is_conversation_scoped() {
    let filters = FilterSet::new()
        .with(FilterKind::Category, FilterValue::text("sushi"))
        .with(FilterKind::City, FilterValue::text("Boston"))
        .with(FilterKind::OpenNow, FilterValue::Flag(true));
    let kept = filters.conversation_scoped();
    assert_eq!(kept.kinds(), vec![FilterKind::City]);
}

#[test]
fn hard_filters_exclude_soft_kinds() {
    let filters = FilterSet::new()
        .with(FilterKind::Category, FilterValue::text("bar"))
        .with(FilterKind::Atmosphere, FilterValue::tags(["quiet"]))
        .with(FilterKind::Landmark, FilterValue::text("the river"));
    assert_eq!(filters.hard().kinds(), vec![FilterKind::Category]);
}

#[test]
fn sanitize_drops_out_of_range_rating_and_empty_text() {
    let mut filters = FilterSet::new()
        .with(FilterKind::MinRating, FilterValue::at_least(7.0))
        .with(FilterKind::City, FilterValue::Text("  ".into()))
        .with(FilterKind::Category, FilterValue::text("thai"));
    let dropped = filters.sanitize();
    assert_eq!(dropped.len(), 2);
    assert_eq!(filters.kinds(), vec![FilterKind::Category]);
}

#[test]
fn mismatched_value_type_is_invalid() {
    let err = FilterValue::Flag(true).validate(FilterKind::Category).unwrap_err();
    assert!(err.to_string().contains("category"));
}

#[test]
fn price_filter_uses_tier_bands() {
    let filters = FilterSet::new().with(FilterKind::PriceLevel, FilterValue::Price(PriceLevel::Low));
    assert!(filters.matches_at(&place("a", |m| m.price_tier = Some(1)), 0));
    assert!(filters.matches_at(&place("b", |m| m.price_tier = Some(2)), 0));
    assert!(!filters.matches_at(&place("c", |m| m.price_tier = Some(3)), 0));
    // Unknown price fails a hard price filter.
    assert!(!filters.matches_at(&place("d", |_| {}), 0));
}

#[test]
fn category_matches_category_or_cuisine() {
    let filters = FilterSet::new().with(FilterKind::Category, FilterValue::text("italian"));
    let trattoria = place("t", |m| m.cuisine = Some("Italian".into()));
    let diner = place("d", |m| m.cuisine = Some("American".into()));
    assert!(filters.matches_at(&trattoria, 0));
    assert!(!filters.matches_at(&diner, 0));
}

#[test]
fn open_now_and_rating_filters() {
    let filters = FilterSet::new()
        .with(FilterKind::OpenNow, FilterValue::Flag(true))
        .with(FilterKind::MinRating, FilterValue::at_least(4.0));
    let good = place("g", |m| {
        m.hours = Some(OpeningHours::new(9 * 60, 22 * 60));
        m.rating = Some(4.5);
    });
    assert!(filters.matches_at(&good, 12 * 60));
    assert!(!filters.matches_at(&good, 23 * 60));

    let low = place("l", |m| {
        m.hours = Some(OpeningHours::always_open());
        m.rating = Some(3.9);
    });
    assert!(!filters.matches_at(&low, 12 * 60));
}

#[test]
fn soft_filters_never_exclude() {
    let filters = FilterSet::new().with(FilterKind::Atmosphere, FilterValue::tags(["romantic"]));
    assert!(filters.matches_at(&place("x", |_| {}), 0));
}

#[test]
fn price_level_steps_saturate() {
    assert_eq!(PriceLevel::Low.cheaper(), PriceLevel::Low);
    assert_eq!(PriceLevel::High.cheaper(), PriceLevel::Moderate);
    assert_eq!(PriceLevel::Moderate.pricier(), PriceLevel::High);
    assert_eq!(PriceLevel::High.pricier(), PriceLevel::High);
}

// ── Weights & ordering ──────────────────────────────────────────────────────

#[test]
fn default_weights_sum_to_one() {
    let w = FactorWeights::default();
    assert!((w.total() - 1.0).abs() < 1e-12);
    assert!(w.validate().is_ok());
}

#[test]
fn redistribution_moves_mass_to_active_factors() {
    let w = FactorWeights::default();
    let active = [RankingFactor::Similarity, RankingFactor::Rating, RankingFactor::Recency];
    let r = w.redistributed(&active);
    assert_eq!(r.proximity, 0.0);
    assert!((r.total() - 1.0).abs() < 1e-12);
    // Proportions between active factors are preserved.
    assert!((r.similarity / r.rating - 2.5).abs() < 1e-9);
}

#[test]
fn ranked_results_order_by_composite_then_reviews_then_id() {
    let mut results = vec![
        ranked("b", 0.8, 10),
        ranked("a", 0.8, 10),
        ranked("c", 0.8, 50),
        ranked("d", 0.9, 1),
    ];
    results.sort_by(|x, y| x.total_cmp(y));
    let ids: Vec<_> = results.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["d", "c", "a", "b"]);
}

proptest! {
    #[test]
    fn renormalized_weights_hit_the_target(
        s in 0.0f64..1.0, r in 0.0f64..1.0, p in 0.0f64..1.0, c in 0.0f64..1.0, target in 0.1f64..1.0,
    ) {
        let w = FactorWeights { similarity: s, rating: r, proximity: p, recency: c, preference: 0.0 };
        prop_assume!(w.total() > 1e-6);
        let n = w.renormalized(target);
        prop_assert!((n.total() - target).abs() < 1e-9);
    }

    #[test]
    fn redistribution_preserves_total(mask in proptest::collection::vec(any::<bool>(), 5)) {
        let active: Vec<_> = RankingFactor::ALL
            .iter()
            .zip(&mask)
            .filter(|(_, on)| **on)
            .map(|(f, _)| *f)
            .collect();
        prop_assume!(!active.is_empty());
        let w = FactorWeights::default();
        let r = w.redistributed(&active);
        prop_assert!((r.total() - w.total()).abs() < 1e-9);
    }
}

// ── Phases ──────────────────────────────────────────────────────────────────

#[test]
fn phase_tracker_walks_the_happy_path() {
    let mut tracker = PhaseTracker::new(DialoguePhase::Idle);
    tracker.begin_search().unwrap();
    tracker.transition(DialoguePhase::Presenting).unwrap();
    tracker.transition(DialoguePhase::AwaitingDisambiguation).unwrap();
    tracker.transition(DialoguePhase::Searching).unwrap();
    assert_eq!(
        tracker.history(),
        &[
            DialoguePhase::Idle,
            DialoguePhase::AwaitingQuery,
            DialoguePhase::Searching,
            DialoguePhase::Presenting,
            DialoguePhase::AwaitingDisambiguation,
            DialoguePhase::Searching,
        ]
    );
}

#[test]
fn phase_tracker_rejects_skipping_states() {
    let mut tracker = PhaseTracker::new(DialoguePhase::Idle);
    let err = tracker.transition(DialoguePhase::Presenting).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            from: DialoguePhase::Idle,
            to: DialoguePhase::Presenting
        }
    ));
    assert_eq!(tracker.current(), DialoguePhase::Idle);
}

#[test]
fn disambiguation_answer_reaches_presenting_through_searching() {
    let mut tracker = PhaseTracker::new(DialoguePhase::AwaitingDisambiguation);
    assert!(tracker.transition(DialoguePhase::Presenting).is_err());
    tracker.begin_search().unwrap();
    tracker.transition(DialoguePhase::Presenting).unwrap();
    assert_eq!(
        tracker.history(),
        &[
            DialoguePhase::AwaitingDisambiguation,
            DialoguePhase::Searching,
            DialoguePhase::Presenting,
        ]
    );
}

#[test]
fn interrupted_resolves_to_searching_or_presenting() {
    assert!(DialoguePhase::Interrupted.can_transition_to(DialoguePhase::Searching));
    assert!(DialoguePhase::Interrupted.can_transition_to(DialoguePhase::Presenting));
    assert!(!DialoguePhase::Interrupted.can_transition_to(DialoguePhase::Idle));
    assert!(DialoguePhase::Searching.can_transition_to(DialoguePhase::Interrupted));
}

#[test]
fn only_resting_phases_are_committable() {
    assert!(DialoguePhase::Idle.is_committable());
    assert!(DialoguePhase::Presenting.is_committable());
    assert!(DialoguePhase::AwaitingDisambiguation.is_committable());
    assert!(!DialoguePhase::Searching.is_committable());
    assert!(!DialoguePhase::Interrupted.is_committable());
}

// ── Conversation state & deltas ─────────────────────────────────────────────

#[test]
fn applying_results_rebuilds_references_in_order() {
    let state = ConversationState::new("call-1");
    let delta = TurnDelta::against(&state)
        .with_turn(TurnRecord::new("find pizza", UtteranceIntent::NewTopic, 2))
        .with_results(vec![ranked("p1", 0.9, 1), ranked("p2", 0.8, 1)])
        .with_phase(DialoguePhase::Presenting);
    let next = state.applied(delta, 5, Utc::now());

    assert_eq!(next.version, 1);
    assert_eq!(next.turn_count, 1);
    assert_eq!(next.references.len(), 2);
    assert_eq!(next.references[1].place_id, "p2");
    assert_eq!(next.references[1].position, 1);
    assert_eq!(next.references[1].turn_index, 1);
    assert_eq!(next.turns.back().unwrap().turn_index, 1);
    assert_eq!(next.phase, DialoguePhase::Presenting);
}

#[test]
fn history_is_bounded() {
    let mut state = ConversationState::new("call-2");
    for i in 0..8 {
        let delta = TurnDelta::against(&state)
            .with_turn(TurnRecord::new(format!("turn {i}"), UtteranceIntent::NewTopic, 0));
        state = state.applied(delta, 5, Utc::now());
    }
    assert_eq!(state.turns.len(), 5);
    assert_eq!(state.turns.front().unwrap().utterance, "turn 3");
    assert_eq!(state.turn_count, 8);
}

#[test]
fn pinned_place_is_not_persisted() {
    let state = ConversationState::new("call-3");
    let filters = FilterSet::new()
        .with(FilterKind::Category, FilterValue::text("tacos"))
        .with(FilterKind::PinnedPlace, FilterValue::text("p1"));
    let next = state.applied(TurnDelta::against(&state).with_filters(filters), 5, Utc::now());
    assert_eq!(next.filters.kinds(), vec![FilterKind::Category]);
}

#[test]
fn remaining_results_follow_the_cursor() {
    let state = ConversationState::new("call-4");
    let delta = TurnDelta::against(&state)
        .with_results(vec![ranked("a", 0.9, 1), ranked("b", 0.8, 1), ranked("c", 0.7, 1)])
        .with_cursor(2);
    let next = state.applied(delta, 5, Utc::now());
    let remaining: Vec<_> = next.remaining_results().iter().map(|r| r.id()).collect();
    assert_eq!(remaining, vec!["c"]);
}

#[test]
fn expiry_uses_last_commit_time() {
    let state = ConversationState::new("call-5");
    let later = state.last_committed_at + chrono::Duration::seconds(301);
    assert!(state.is_expired(Duration::from_secs(300), later));
    assert!(!state.is_expired(Duration::from_secs(300), state.last_committed_at));
}

#[test]
fn recovery_decision_per_intent() {
    assert_eq!(RecoveryDecision::for_intent(UtteranceIntent::NewTopic), RecoveryDecision::Restart);
    assert_eq!(RecoveryDecision::for_intent(UtteranceIntent::Reset), RecoveryDecision::Restart);
    assert_eq!(RecoveryDecision::for_intent(UtteranceIntent::Anaphora), RecoveryDecision::Restart);
    assert_eq!(
        RecoveryDecision::for_intent(UtteranceIntent::FilterRefinement),
        RecoveryDecision::Refine
    );
    assert_eq!(RecoveryDecision::for_intent(UtteranceIntent::Interjection), RecoveryDecision::Resume);
    assert!(!RecoveryDecision::Resume.cancels_in_flight());
}

#[test]
fn cancellation_token_clones_share_the_flag() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(token.same_as(&clone));
    assert!(!token.same_as(&CancellationToken::new()));

    assert!(clone.checkpoint("s").is_ok());
    token.cancel();
    assert!(clone.is_cancelled());
    assert!(clone.checkpoint("s").is_err());
}

#[test]
fn structured_query_serializes_without_dropped_filters() {
    let query = StructuredQuery {
        embedding_text: "cheap tacos".into(),
        expansion_terms: vec![],
        filters: FilterSet::new(),
        soft_weights: FactorWeights::default(),
        intent: UtteranceIntent::NewTopic,
        pinned: None,
        sort: SortMode::BestMatch,
        more_like_that: false,
        dropped_filters: vec![concierge_core::errors::QueryError::InvalidFilterValue {
            kind: "price".into(),
            value: "zillions".into(),
            reason: "unknown price level".into(),
        }],
    };
    let json = serde_json::to_value(&query).unwrap();
    assert!(json.get("dropped_filters").is_none());

    let back: StructuredQuery = serde_json::from_value(json).unwrap();
    assert!(back.dropped_filters.is_empty());
    assert_eq!(back.embedding_text, "cheap tacos");
}
