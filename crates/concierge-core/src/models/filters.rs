//! Active filter set: filter kind → value.
//!
//! Hard kinds constrain which candidates may be returned; soft kinds
//! (atmosphere, landmark) only feed the embedding text and the
//! stated-preference ranking factor.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_RATING;
use crate::errors::QueryError;

use super::place::PlaceCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Category,
    PriceLevel,
    OpenNow,
    MinRating,
    Atmosphere,
    City,
    Landmark,
    PinnedPlace,
}

impl FilterKind {
    pub const ALL: [FilterKind; 8] = [
        Self::Category,
        Self::PriceLevel,
        Self::OpenNow,
        Self::MinRating,
        Self::Atmosphere,
        Self::City,
        Self::Landmark,
        Self::PinnedPlace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::PriceLevel => "price",
            Self::OpenNow => "open_now",
            Self::MinRating => "min_rating",
            Self::Atmosphere => "atmosphere",
            Self::City => "city",
            Self::Landmark => "landmark",
            Self::PinnedPlace => "pinned_place",
        }
    }

    /// Survives topic changes; cleared only by an explicit reset.
    pub fn is_conversation_scoped(&self) -> bool {
        matches!(self, Self::City)
    }

    /// Soft kinds never exclude a candidate.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Atmosphere | Self::Landmark)
    }

    /// Query-scoped kinds are never persisted into conversation state.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PinnedPlace)
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse price band a user can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLevel {
    Low,
    Moderate,
    High,
}

impl PriceLevel {
    /// Price tiers accepted by this band ($ = 1 .. $$$$ = 4).
    pub fn tiers(&self) -> RangeInclusive<u8> {
        match self {
            Self::Low => 1..=2,
            Self::Moderate => 2..=3,
            Self::High => 3..=4,
        }
    }

    /// Ideal tier for preference matching.
    pub fn target_tier(&self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Moderate => 2.5,
            Self::High => 4.0,
        }
    }

    pub fn cheaper(&self) -> Self {
        match self {
            Self::Low | Self::Moderate => Self::Low,
            Self::High => Self::Moderate,
        }
    }

    pub fn pricier(&self) -> Self {
        match self {
            Self::Low => Self::Moderate,
            Self::Moderate | Self::High => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    Price(PriceLevel),
    Flag(bool),
    Range { min: Option<f64>, max: Option<f64> },
    Tags(BTreeSet<String>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into().to_lowercase())
    }

    pub fn at_least(min: f64) -> Self {
        Self::Range {
            min: Some(min),
            max: None,
        }
    }

    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tags(tags.into_iter().map(|t| t.into().to_lowercase()).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_price(&self) -> Option<PriceLevel> {
        match self {
            Self::Price(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Tags(t) => Some(t),
            _ => None,
        }
    }

    /// Check that a value is well-formed for the given kind.
    pub fn validate(&self, kind: FilterKind) -> Result<(), QueryError> {
        let invalid = |reason: &str| QueryError::InvalidFilterValue {
            kind: kind.to_string(),
            value: self.describe(),
            reason: reason.to_string(),
        };

        match (kind, self) {
            (
                FilterKind::Category | FilterKind::City | FilterKind::Landmark | FilterKind::PinnedPlace,
                Self::Text(s),
            ) => {
                if s.trim().is_empty() {
                    Err(invalid("empty text"))
                } else {
                    Ok(())
                }
            }
            (FilterKind::PriceLevel, Self::Price(_)) => Ok(()),
            (FilterKind::OpenNow, Self::Flag(_)) => Ok(()),
            (FilterKind::MinRating, Self::Range { min, max }) => {
                let in_scale = |v: &Option<f64>| {
                    v.map_or(true, |x| x.is_finite() && (0.0..=MAX_RATING).contains(&x))
                };
                if min.is_none() && max.is_none() {
                    Err(invalid("unbounded range"))
                } else if !in_scale(min) || !in_scale(max) {
                    Err(invalid("rating outside 0-5"))
                } else if matches!((min, max), (Some(lo), Some(hi)) if lo > hi) {
                    Err(invalid("min above max"))
                } else {
                    Ok(())
                }
            }
            (FilterKind::Atmosphere, Self::Tags(tags)) => {
                if tags.is_empty() {
                    Err(invalid("no tags"))
                } else {
                    Ok(())
                }
            }
            _ => Err(invalid("value type does not fit filter kind")),
        }
    }

    /// Human-readable rendering used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Price(p) => p.as_str().to_string(),
            Self::Flag(b) => b.to_string(),
            Self::Range { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => format!("{lo}..={hi}"),
                (Some(lo), None) => format!(">={lo}"),
                (None, Some(hi)) => format!("<={hi}"),
                (None, None) => "..".to_string(),
            },
            Self::Tags(t) => t.iter().cloned().collect::<Vec<_>>().join(","),
        }
    }
}

/// Ordered mapping of filter kind to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSet {
    entries: BTreeMap<FilterKind, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: FilterKind, value: FilterValue) -> Self {
        self.insert(kind, value);
        self
    }

    pub fn insert(&mut self, kind: FilterKind, value: FilterValue) -> Option<FilterValue> {
        self.entries.insert(kind, value)
    }

    pub fn get(&self, kind: FilterKind) -> Option<&FilterValue> {
        self.entries.get(&kind)
    }

    pub fn remove(&mut self, kind: FilterKind) -> Option<FilterValue> {
        self.entries.remove(&kind)
    }

    pub fn contains(&self, kind: FilterKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKind, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn kinds(&self) -> Vec<FilterKind> {
        self.entries.keys().copied().collect()
    }

    pub fn price_level(&self) -> Option<PriceLevel> {
        self.get(FilterKind::PriceLevel).and_then(FilterValue::as_price)
    }

    pub fn category(&self) -> Option<&str> {
        self.get(FilterKind::Category).and_then(FilterValue::as_text)
    }

    /// Overlay `newer` on top of `self`: same-kind values are replaced,
    /// everything else persists.
    pub fn merge(&mut self, newer: &FilterSet) {
        for (kind, value) in newer.iter() {
            self.entries.insert(kind, value.clone());
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(FilterKind, &FilterValue) -> bool) {
        self.entries.retain(|k, v| keep(*k, v));
    }

    /// Only the conversation-scoped entries (kept across topic changes).
    pub fn conversation_scoped(&self) -> FilterSet {
        self.filtered(|k| k.is_conversation_scoped())
    }

    /// Entries that constrain retrieval.
    pub fn hard(&self) -> FilterSet {
        self.filtered(|k| !k.is_soft())
    }

    /// Entries that belong in persisted conversation state.
    pub fn persistent(&self) -> FilterSet {
        self.filtered(|k| !k.is_transient())
    }

    fn filtered(&self, keep: impl Fn(FilterKind) -> bool) -> FilterSet {
        FilterSet {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| keep(**k))
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
        }
    }

    /// Drop every malformed entry, returning the errors for logging.
    pub fn sanitize(&mut self) -> Vec<QueryError> {
        let mut dropped = Vec::new();
        self.entries.retain(|kind, value| match value.validate(*kind) {
            Ok(()) => true,
            Err(e) => {
                dropped.push(e);
                false
            }
        });
        dropped
    }

    /// Whether a candidate passes every hard filter at the given local time.
    ///
    /// A candidate lacking the attribute a hard filter constrains fails it.
    pub fn matches_at(&self, candidate: &PlaceCandidate, minute_of_day: u16) -> bool {
        let meta = &candidate.metadata;
        self.entries.iter().all(|(kind, value)| match (kind, value) {
            (k, _) if k.is_soft() => true,
            (FilterKind::Category, FilterValue::Text(wanted)) => {
                let category = meta.category.to_lowercase();
                category == *wanted
                    || category.contains(wanted.as_str())
                    || meta
                        .cuisine
                        .as_deref()
                        .is_some_and(|c| c.eq_ignore_ascii_case(wanted))
            }
            (FilterKind::PriceLevel, FilterValue::Price(level)) => meta
                .price_tier()
                .is_some_and(|tier| level.tiers().contains(&tier)),
            (FilterKind::OpenNow, FilterValue::Flag(required)) => {
                !*required || meta.hours.is_some_and(|h| h.is_open_at(minute_of_day))
            }
            (FilterKind::MinRating, FilterValue::Range { min, max }) => {
                meta.rating.is_some_and(|r| {
                    min.map_or(true, |lo| r >= lo) && max.map_or(true, |hi| r <= hi)
                })
            }
            (FilterKind::City, FilterValue::Text(city)) => meta
                .city
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(city)),
            (FilterKind::PinnedPlace, FilterValue::Text(id)) => candidate.id == *id,
            _ => false,
        })
    }

    /// [`matches_at`](Self::matches_at) evaluated at the current local time.
    pub fn matches(&self, candidate: &PlaceCandidate) -> bool {
        use chrono::Timelike;
        let now = chrono::Local::now();
        let minute = (now.hour() * 60 + now.minute()) as u16;
        self.matches_at(candidate, minute)
    }
}

impl FromIterator<(FilterKind, FilterValue)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (FilterKind, FilterValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
