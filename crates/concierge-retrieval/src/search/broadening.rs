//! Filter broadening after an empty result.
//!
//! Each step relaxes more of the hard constraints:
//! qualifiers (open-now, rating, atmosphere) → price → category → location only.

use serde::{Deserialize, Serialize};

use concierge_core::models::{FilterKind, FilterSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadeningStep {
    RelaxQualifiers,
    DropPrice,
    DropCategory,
    LocationOnly,
}

impl BroadeningStep {
    pub const ALL: [BroadeningStep; 4] = [
        Self::RelaxQualifiers,
        Self::DropPrice,
        Self::DropCategory,
        Self::LocationOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RelaxQualifiers => "relax_qualifiers",
            Self::DropPrice => "drop_price",
            Self::DropCategory => "drop_category",
            Self::LocationOnly => "location_only",
        }
    }

    fn keeps(&self, kind: FilterKind) -> bool {
        let qualifier = matches!(
            kind,
            FilterKind::OpenNow | FilterKind::MinRating | FilterKind::Atmosphere
        );
        match self {
            Self::RelaxQualifiers => !qualifier,
            Self::DropPrice => !qualifier && kind != FilterKind::PriceLevel,
            Self::DropCategory => {
                !qualifier && !matches!(kind, FilterKind::PriceLevel | FilterKind::Category)
            }
            Self::LocationOnly => matches!(kind, FilterKind::City | FilterKind::Landmark),
        }
    }
}

/// The broadening ladder for `filters`, skipping steps that change nothing.
pub fn broaden(filters: &FilterSet) -> Vec<(BroadeningStep, FilterSet)> {
    let mut ladder = Vec::new();
    let mut previous = filters.clone();
    for step in BroadeningStep::ALL {
        let mut relaxed = filters.clone();
        relaxed.retain(|kind, _| step.keeps(kind));
        if relaxed != previous {
            previous = relaxed.clone();
            ladder.push((step, relaxed));
        }
    }
    ladder
}
