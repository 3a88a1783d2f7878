use serde::{Deserialize, Serialize};

use crate::errors::QueryError;
use crate::intent::UtteranceIntent;

use super::conversation::PlaceRef;
use super::filters::FilterSet;
use super::ranked::FactorWeights;

/// How results are ordered before presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    BestMatch,
    RatingHigh,
    PriceLow,
    Distance,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestMatch => "best_match",
            Self::RatingHigh => "rating_high",
            Self::PriceLow => "price_low",
            Self::Distance => "distance",
        }
    }
}

/// Retrieval-ready form of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub embedding_text: String,
    /// Synonyms appended to the search text when expansion is enabled.
    pub expansion_terms: Vec<String>,
    /// Full merged filter set (hard and soft kinds).
    pub filters: FilterSet,
    pub soft_weights: FactorWeights,
    pub intent: UtteranceIntent,
    /// Resolved drill-down target, if any.
    pub pinned: Option<PlaceRef>,
    pub sort: SortMode,
    pub more_like_that: bool,
    /// Malformed values removed while building. Diagnostic only.
    #[serde(skip)]
    pub dropped_filters: Vec<QueryError>,
}

impl StructuredQuery {
    /// Filters that constrain retrieval.
    pub fn hard_filters(&self) -> FilterSet {
        self.filters.hard()
    }

    /// Search text with expansion terms appended.
    pub fn search_text(&self, with_expansion: bool) -> String {
        if !with_expansion || self.expansion_terms.is_empty() {
            return self.embedding_text.clone();
        }
        let mut text = self.embedding_text.clone();
        for term in &self.expansion_terms {
            text.push(' ');
            text.push_str(term);
        }
        text
    }
}
