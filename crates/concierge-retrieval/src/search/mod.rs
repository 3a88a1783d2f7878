//! Vector retrieval: structured query → raw candidates.
//!
//! Pass-through to an [`IVectorStore`]. No ranking happens here; similarity
//! is the only score returned.

pub mod broadening;

use std::sync::Arc;
use std::time::Duration;

use concierge_core::config::RetrievalConfig;
use concierge_core::constants::MAX_TOP_K;
use concierge_core::errors::{ConciergeResult, RetrievalError};
use concierge_core::models::{FilterSet, PlaceCandidate, StructuredQuery};
use concierge_core::traits::IVectorStore;
use tracing::{debug, warn};

pub use broadening::{broaden, BroadeningStep};

/// Bounded, retrying adapter over a blocking vector backend.
pub struct VectorRetrievalAdapter {
    store: Arc<dyn IVectorStore>,
    config: RetrievalConfig,
    /// Local time used for open-now post-filtering; `None` reads the clock.
    minute_of_day: Option<u16>,
}

impl VectorRetrievalAdapter {
    pub fn new(store: Arc<dyn IVectorStore>, config: RetrievalConfig) -> Self {
        Self {
            store,
            config,
            minute_of_day: None,
        }
    }

    /// Pin the local time used when post-filtering opening hours.
    pub fn at_minute_of_day(mut self, minute: u16) -> Self {
        self.minute_of_day = Some(minute);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.store.name()
    }

    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }

    /// Search with the query's hard filters.
    ///
    /// Empty results are `Ok(vec![])`. Exhausted retries fail with
    /// [`RetrievalError::BackendUnavailable`].
    pub async fn search(
        &self,
        query: &StructuredQuery,
        top_k: usize,
    ) -> ConciergeResult<Vec<PlaceCandidate>> {
        self.search_with_filters(query, &query.hard_filters(), top_k)
            .await
    }

    /// Search with an explicit filter set (used by the broadening ladder).
    pub async fn search_with_filters(
        &self,
        query: &StructuredQuery,
        filters: &FilterSet,
        top_k: usize,
    ) -> ConciergeResult<Vec<PlaceCandidate>> {
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(RetrievalError::InvalidTopK {
                top_k,
                max: MAX_TOP_K,
            }
            .into());
        }

        let text = query.search_text(self.config.query_expansion);
        let filters = filters.hard();
        let attempts = self.config.max_attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.backoff(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying vector search");
                tokio::time::sleep(delay).await;
            }

            match self.attempt(&text, &filters, top_k).await {
                Ok(candidates) => {
                    let candidates = self.post_filter(candidates, &filters, top_k);
                    debug!(
                        backend = self.store.name(),
                        attempt,
                        returned = candidates.len(),
                        "vector search complete"
                    );
                    return Ok(candidates);
                }
                Err(reason) => {
                    warn!(backend = self.store.name(), attempt, %reason, "vector search failed");
                    last_reason = reason;
                }
            }
        }

        Err(RetrievalError::BackendUnavailable {
            backend: self.store.name().to_string(),
            attempts,
            reason: last_reason,
        }
        .into())
    }

    /// `backoff_base_ms · 2^(attempt-2)` before attempt `attempt` (≥ 2).
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(2).min(16);
        Duration::from_millis(self.config.backoff_base_ms.saturating_mul(1u64 << exp))
    }

    async fn attempt(
        &self,
        text: &str,
        filters: &FilterSet,
        top_k: usize,
    ) -> Result<Vec<PlaceCandidate>, String> {
        let store = Arc::clone(&self.store);
        let text = text.to_string();
        let filters = filters.clone();
        let task = tokio::task::spawn_blocking(move || store.search(&text, &filters, top_k));

        let timeout = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(timeout, task).await {
            Err(_) => Err(format!("timed out after {}ms", self.config.timeout_ms)),
            Ok(Err(join)) => Err(format!("search task failed: {join}")),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Ok(Ok(candidates))) => Ok(candidates),
        }
    }

    /// Drop candidates with unusable scores and, for backends without
    /// server-side filtering, those failing a hard filter.
    fn post_filter(
        &self,
        candidates: Vec<PlaceCandidate>,
        filters: &FilterSet,
        top_k: usize,
    ) -> Vec<PlaceCandidate> {
        let before = candidates.len();
        let server_side = self.store.supports_filtering();
        let mut kept: Vec<PlaceCandidate> = candidates
            .into_iter()
            .filter(|c| c.similarity.is_finite())
            .filter(|c| {
                server_side
                    || match self.minute_of_day {
                        Some(minute) => filters.matches_at(c, minute),
                        None => filters.matches(c),
                    }
            })
            .collect();
        kept.truncate(top_k);
        if kept.len() != before {
            debug!(before, after = kept.len(), server_side, "post-filtered candidates");
        }
        kept
    }
}
