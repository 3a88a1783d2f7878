// Single source of truth for all default values.

// --- Retrieval ---
pub const DEFAULT_TOP_K: usize = 15;
pub const DEFAULT_RETRIEVAL_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 100;
pub const DEFAULT_QUERY_EXPANSION: bool = false;
pub const DEFAULT_MAX_BROADENING_STEPS: usize = 4;

// --- Ranking ---
pub const DEFAULT_WEIGHT_TOTAL: f64 = 1.0;
pub const DEFAULT_RECENCY_DECAY: f64 = 0.5;
pub const DEFAULT_PROXIMITY_SCALE_KM: f64 = 2.0;
pub const DEFAULT_EMPHASIS_BOOST: f64 = 0.2;
pub const DEFAULT_PREFERENCE_BOOST: f64 = 0.15;

// --- Session ---
pub const DEFAULT_HISTORY_DEPTH: usize = 5;
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

// --- Dialogue ---
pub const DEFAULT_SHORTLIST_SIZE: usize = 3;
pub const DEFAULT_CHUNK_CHARS: usize = 100;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
pub const DEFAULT_TURN_LOG_CAPACITY: usize = 10_000;
pub const DEFAULT_DEGRADATION_HISTORY: usize = 1_000;
