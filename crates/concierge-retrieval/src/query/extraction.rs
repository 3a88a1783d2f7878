//! Filter extraction: utterance → explicit filter mentions.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use concierge_core::models::{
    FilterKind, FilterSet, FilterValue, PriceLevel, RankingFactor, SortMode,
};
use regex::Regex;

use super::lexicon;
use super::utterance::Utterance;

/// "at least 4 stars", "above 4.5", "minimum of 3 stars".
static MIN_RATING_LEADING_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:at least|minimum of|minimum|over|above|more than|better than)\s+(\d+(?:\.\d+)?)(?:\s+stars?)?\b").ok()
});

/// "4 stars or more", "4.5 stars and up", "5 star".
static MIN_RATING_TRAILING_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)\s+stars?\b").ok());

/// Relative price movement against the active price filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceShift {
    Cheaper,
    Pricier,
}

impl PriceShift {
    /// Apply to the active level. With nothing active the shift starts from
    /// the middle band.
    pub fn apply(&self, active: Option<PriceLevel>) -> PriceLevel {
        let from = active.unwrap_or(PriceLevel::Moderate);
        match self {
            Self::Cheaper => from.cheaper(),
            Self::Pricier => from.pricier(),
        }
    }
}

/// Everything explicitly mentioned in one utterance.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Absolute filter mentions. Values are not validated yet.
    pub filters: FilterSet,
    pub price_shift: Option<PriceShift>,
    pub emphasis: Vec<RankingFactor>,
    pub sort: Option<SortMode>,
    pub more_like_that: bool,
    /// A category/cuisine mention or any content word outside the filter lexicon.
    pub topical: bool,
}

impl Extraction {
    /// Whether the utterance mentions any filter, ordering, or emphasis.
    pub fn mentions_filters(&self) -> bool {
        !self.filters.is_empty()
            || self.price_shift.is_some()
            || !self.emphasis.is_empty()
            || self.sort.is_some()
            || self.more_like_that
    }
}

/// Extract every filter mention from an utterance.
pub fn extract(utterance: &Utterance) -> Extraction {
    let mut out = Extraction::default();

    let category = category_of(utterance);
    if let Some(category) = category {
        out.filters
            .insert(FilterKind::Category, FilterValue::text(category));
    }

    if utterance.has_any(lexicon::CHEAPER) {
        out.price_shift = Some(PriceShift::Cheaper);
    } else if utterance.has_any(lexicon::PRICIER) {
        out.price_shift = Some(PriceShift::Pricier);
    } else if let Some(level) = price_level_of(utterance) {
        out.filters
            .insert(FilterKind::PriceLevel, FilterValue::Price(level));
    }

    if utterance.has_any(lexicon::OPEN_NOW) {
        out.filters.insert(FilterKind::OpenNow, FilterValue::Flag(true));
    }

    if let Some(min) = min_rating_of(utterance) {
        out.filters
            .insert(FilterKind::MinRating, FilterValue::at_least(min));
    }

    let tags: BTreeSet<String> = lexicon::ATMOSPHERE
        .iter()
        .filter(|(_, phrases)| utterance.has_any(phrases))
        .map(|(tag, _)| tag.to_string())
        .collect();
    if !tags.is_empty() {
        out.filters.insert(FilterKind::Atmosphere, FilterValue::Tags(tags));
    }

    if let Some(city) = city_of(utterance) {
        out.filters.insert(FilterKind::City, FilterValue::text(city));
    }

    let landmark = landmark_of(utterance);
    if let Some((landmark, _)) = &landmark {
        out.filters
            .insert(FilterKind::Landmark, FilterValue::text(landmark.clone()));
    }

    out.emphasis = lexicon::EMPHASIS
        .iter()
        .filter(|(_, phrases)| utterance.has_any(phrases))
        .map(|(factor, _)| *factor)
        .collect();

    out.sort = lexicon::SORT_PHRASES
        .iter()
        .find(|(_, phrases)| utterance.has_any(phrases))
        .map(|(mode, _)| *mode);

    out.more_like_that = utterance.has_any(lexicon::MORE_LIKE_THAT);

    let landmark_span = landmark.map(|(_, span)| span);
    out.topical = category.is_some() || has_content_words(utterance, landmark_span);
    out
}

/// Cuisine first, then place type.
pub fn category_of(utterance: &Utterance) -> Option<&'static str> {
    lexicon::CUISINES
        .iter()
        .chain(lexicon::PLACE_TYPES)
        .find(|(_, phrases)| utterance.has_any(phrases))
        .map(|(category, _)| *category)
}

fn price_level_of(utterance: &Utterance) -> Option<PriceLevel> {
    lexicon::PRICE_WORDS
        .iter()
        .find(|(_, phrases)| utterance.has_any(phrases))
        .map(|(level, _)| *level)
}

fn min_rating_of(utterance: &Utterance) -> Option<f64> {
    let text = utterance.padded();
    for re in [&MIN_RATING_LEADING_RE, &MIN_RATING_TRAILING_RE] {
        let Some(re) = LazyLock::force(re).as_ref() else {
            continue;
        };
        if let Some(value) = re
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            return Some(value);
        }
    }
    utterance
        .has_any(lexicon::HIGHLY_RATED)
        .then_some(lexicon::HIGHLY_RATED_MIN)
}

fn city_of(utterance: &Utterance) -> Option<&'static str> {
    lexicon::CITIES
        .iter()
        .copied()
        .find(|city| utterance.has(&format!("in {city}")))
        .or_else(|| lexicon::CITIES.iter().copied().find(|city| utterance.has(city)))
}

/// Landmark phrase and the token span it occupies.
fn landmark_of(utterance: &Utterance) -> Option<(String, (usize, usize))> {
    let tokens = utterance.tokens();
    for trigger in lexicon::LANDMARK_TRIGGERS {
        let Some(at) = utterance.position_of(trigger) else {
            continue;
        };
        let start = at + trigger.split(' ').count();
        let words: Vec<&str> = tokens[start..]
            .iter()
            .map(String::as_str)
            .take_while(|w| {
                !lexicon::STOP_WORD_SET.contains(*w) && !lexicon::FILTER_WORDS.contains(*w)
            })
            .take(3)
            .collect();
        if !words.is_empty() {
            return Some((words.join(" "), (start, start + words.len())));
        }
    }
    None
}

fn has_content_words(utterance: &Utterance, skip: Option<(usize, usize)>) -> bool {
    utterance.tokens().iter().enumerate().any(|(i, token)| {
        let skipped = skip.is_some_and(|(from, to)| i >= from && i < to);
        !skipped
            && !lexicon::STOP_WORD_SET.contains(token.as_str())
            && !lexicon::FILTER_WORDS.contains(token.as_str())
            && !lexicon::INTERJECTION_SET.contains(token.as_str())
            && token.parse::<f64>().is_err()
    })
}
