//! QueryBuilder: utterance + conversation state → structured query.
//!
//! Classify → extract → merge with active filters → validate → resolve
//! references → choose embedding text → derive per-turn weights.

pub mod anaphora;
pub mod classifier;
pub mod expansion;
pub mod extraction;
pub mod lexicon;
pub mod utterance;

use concierge_core::config::{ConciergeConfig, RankingConfig};
use concierge_core::errors::QueryError;
use concierge_core::intent::UtteranceIntent;
use concierge_core::models::{
    ConversationState, FactorWeights, FilterKind, FilterSet, FilterValue, RankingFactor, SortMode,
    StructuredQuery,
};
use tracing::{debug, warn};

pub use anaphora::Mention;
pub use classifier::classify;
pub use extraction::{Extraction, PriceShift};
pub use utterance::Utterance;

/// A reference the builder could not resolve; the caller runs a
/// disambiguation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbiguousReference {
    pub mention: String,
    /// Number of places currently held.
    pub held: usize,
    /// Invalid filter values dropped before resolution failed.
    pub dropped_filters: Vec<QueryError>,
}

impl AmbiguousReference {
    pub fn to_error(&self) -> QueryError {
        QueryError::AmbiguousReference {
            mention: self.mention.clone(),
            held: self.held,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Ready(StructuredQuery),
    Ambiguous(AmbiguousReference),
}

impl BuildOutcome {
    pub fn query(&self) -> Option<&StructuredQuery> {
        match self {
            Self::Ready(q) => Some(q),
            Self::Ambiguous(_) => None,
        }
    }
}

/// Turns an utterance and the current state into a [`StructuredQuery`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    ranking: RankingConfig,
    query_expansion: bool,
}

impl QueryBuilder {
    pub fn new(config: &ConciergeConfig) -> Self {
        Self {
            ranking: config.ranking.clone(),
            query_expansion: config.retrieval.query_expansion,
        }
    }

    pub fn build(&self, utterance: &str, state: &ConversationState) -> BuildOutcome {
        let parsed = Utterance::parse(utterance);
        let extraction = extraction::extract(&parsed);
        let intent = classifier::classify_parsed(&parsed, &extraction, state);

        let mut filters = self.merge_filters(intent, &extraction, state);
        let dropped = filters.sanitize();
        for err in &dropped {
            warn!(session = %state.session_key, error = %err, "dropping invalid filter value");
        }

        let pinned = if intent == UtteranceIntent::Anaphora {
            match anaphora::detect(&parsed, state).map(|m| anaphora::resolve(&m, state)) {
                Some(Ok(reference)) => Some(reference),
                Some(Err(QueryError::AmbiguousReference { mention, held })) => {
                    debug!(session = %state.session_key, %mention, held, "ambiguous reference");
                    return BuildOutcome::Ambiguous(AmbiguousReference {
                        mention,
                        held,
                        dropped_filters: dropped,
                    });
                }
                Some(Err(_)) | None => None,
            }
        } else {
            None
        };
        if let Some(reference) = &pinned {
            filters.insert(
                FilterKind::PinnedPlace,
                FilterValue::Text(reference.place_id.clone()),
            );
        }

        let embedding_text = embedding_text(intent, &parsed, state, &filters);
        let expansion_terms = match filters.category() {
            Some(category) if self.query_expansion => expansion::expand(category, &parsed),
            _ => Vec::new(),
        };
        let soft_weights = self.soft_weights(&extraction, &filters);
        let sort = extraction.sort.unwrap_or(SortMode::BestMatch);

        debug!(
            session = %state.session_key,
            intent = %intent,
            filters = filters.len(),
            pinned = pinned.is_some(),
            sort = sort.as_str(),
            "built structured query"
        );

        BuildOutcome::Ready(StructuredQuery {
            embedding_text,
            expansion_terms,
            filters,
            soft_weights,
            intent,
            pinned,
            sort,
            more_like_that: extraction.more_like_that,
            dropped_filters: dropped,
        })
    }

    /// New topics keep only conversation-scoped filters; refinements and
    /// references keep everything; resets start empty. Explicit mentions
    /// override same-kind values.
    fn merge_filters(
        &self,
        intent: UtteranceIntent,
        extraction: &Extraction,
        state: &ConversationState,
    ) -> FilterSet {
        let mut merged = match intent {
            UtteranceIntent::Reset => return FilterSet::new(),
            UtteranceIntent::NewTopic => state.filters.conversation_scoped(),
            UtteranceIntent::FilterRefinement
            | UtteranceIntent::Anaphora
            | UtteranceIntent::Interjection => state.filters.clone(),
        };
        merged.merge(&extraction.filters);

        if let Some(shift) = extraction.price_shift {
            let level = shift.apply(merged.price_level());
            merged.insert(FilterKind::PriceLevel, FilterValue::Price(level));
        }
        merged
    }

    fn soft_weights(&self, extraction: &Extraction, filters: &FilterSet) -> FactorWeights {
        let mut weights = self.ranking.weights;
        for factor in &extraction.emphasis {
            let boosted = weights.get(*factor) + self.ranking.emphasis_boost;
            weights.set(*factor, boosted.min(1.0));
        }
        if filters.contains(FilterKind::PriceLevel) || filters.contains(FilterKind::Atmosphere) {
            let boosted = weights.get(RankingFactor::Preference) + self.ranking.preference_boost;
            weights.set(RankingFactor::Preference, boosted.min(1.0));
        }
        weights.renormalized(self.ranking.weight_total)
    }
}

/// New topics search with what was said; everything else reuses the
/// remembered topic so refinements never drift.
fn embedding_text(
    intent: UtteranceIntent,
    utterance: &Utterance,
    state: &ConversationState,
    filters: &FilterSet,
) -> String {
    let base = match (intent, &state.topic) {
        (UtteranceIntent::NewTopic | UtteranceIntent::Reset, _) | (_, None) => {
            utterance.raw().to_string()
        }
        (_, Some(topic)) => topic.clone(),
    };
    match filters.get(FilterKind::Landmark).and_then(FilterValue::as_text) {
        Some(landmark) if !utterance::normalize(&base).contains(landmark) => {
            format!("{base} near {landmark}")
        }
        _ => base,
    }
}
