/// Concierge version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Highest rating a place can carry.
pub const MAX_RATING: f64 = 5.0;

/// Cheapest and most expensive price tiers ($ .. $$$$).
pub const MIN_PRICE_TIER: u8 = 1;
pub const MAX_PRICE_TIER: u8 = 4;

/// Minutes in a day, used for opening-hours arithmetic.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Upper bound on candidates requested from a vector backend in one call.
pub const MAX_TOP_K: usize = 200;
