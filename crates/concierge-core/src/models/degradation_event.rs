use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recorded when a turn is served in a lower-quality mode because a
/// collaborator failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationEvent {
    /// Subsystem that failed ("vector_store", ...).
    pub component: String,
    pub session_key: String,
    pub failure: String,
    /// "cached_results" or "empty_message".
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}

impl DegradationEvent {
    pub fn new(
        component: impl Into<String>,
        session_key: impl Into<String>,
        failure: impl Into<String>,
        fallback_used: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            session_key: session_key.into(),
            failure: failure.into(),
            fallback_used: fallback_used.into(),
            timestamp: Utc::now(),
        }
    }
}
