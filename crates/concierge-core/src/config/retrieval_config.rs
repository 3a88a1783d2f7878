use serde::{Deserialize, Serialize};

use super::defaults;

/// Vector retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from the backend per search.
    pub top_k: usize,
    /// Per-attempt backend timeout in milliseconds.
    pub timeout_ms: u64,
    /// Attempts before the backend is declared unavailable.
    pub max_attempts: u32,
    /// First retry delay; doubles on every further attempt.
    pub backoff_base_ms: u64,
    /// Append category synonyms to the search text.
    pub query_expansion: bool,
    /// Broadening steps tried after an empty result.
    pub max_broadening_steps: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_TOP_K,
            timeout_ms: defaults::DEFAULT_RETRIEVAL_TIMEOUT_MS,
            max_attempts: defaults::DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: defaults::DEFAULT_BACKOFF_BASE_MS,
            query_expansion: defaults::DEFAULT_QUERY_EXPANSION,
            max_broadening_steps: defaults::DEFAULT_MAX_BROADENING_STEPS,
        }
    }
}
