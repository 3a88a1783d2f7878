use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_RADIUS_KM, MAX_PRICE_TIER, MINUTES_PER_DAY, MIN_PRICE_TIER};

/// Stable place identifier assigned by the vector backend.
pub type PlaceId = String;

/// WGS84 coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Daily opening window in local minutes since midnight.
///
/// `close_minute < open_minute` describes a window that crosses midnight.
/// `open_minute == 0 && close_minute == 1440` is open around the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_minute: u16,
    pub close_minute: u16,
}

impl OpeningHours {
    pub fn new(open_minute: u16, close_minute: u16) -> Self {
        Self {
            open_minute: open_minute.min(MINUTES_PER_DAY),
            close_minute: close_minute.min(MINUTES_PER_DAY),
        }
    }

    pub fn always_open() -> Self {
        Self::new(0, MINUTES_PER_DAY)
    }

    pub fn is_open_at(&self, minute_of_day: u16) -> bool {
        let m = minute_of_day % MINUTES_PER_DAY;
        if self.open_minute <= self.close_minute {
            m >= self.open_minute && m < self.close_minute
        } else {
            m >= self.open_minute || m < self.close_minute
        }
    }
}

/// Snapshot of a place's descriptive metadata as stored in the index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceMetadata {
    pub name: String,
    /// Place type ("restaurant", "bar", "park", ...).
    pub category: String,
    pub cuisine: Option<String>,
    /// Average rating on a 0–5 scale.
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    /// 1 ($) through 4 ($$$$).
    pub price_tier: Option<u8>,
    pub coordinates: Option<Coordinates>,
    pub hours: Option<OpeningHours>,
    pub atmosphere: Vec<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
}

impl PlaceMetadata {
    /// Price tier clamped into the valid range, if known.
    pub fn price_tier(&self) -> Option<u8> {
        self.price_tier
            .map(|t| t.clamp(MIN_PRICE_TIER, MAX_PRICE_TIER))
    }

    pub fn has_atmosphere(&self, tag: &str) -> bool {
        self.atmosphere.iter().any(|a| a.eq_ignore_ascii_case(tag))
    }
}

/// A raw candidate returned by the vector backend. Immutable once retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub id: PlaceId,
    /// Backend similarity. Opaque comparable float; scale is backend-defined.
    pub similarity: f64,
    pub metadata: PlaceMetadata,
}

impl PlaceCandidate {
    pub fn new(id: impl Into<PlaceId>, similarity: f64, metadata: PlaceMetadata) -> Self {
        Self {
            id: id.into(),
            similarity,
            metadata,
        }
    }

    pub fn review_count(&self) -> u32 {
        self.metadata.review_count.unwrap_or(0)
    }
}
