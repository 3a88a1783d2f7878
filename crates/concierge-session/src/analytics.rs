//! Per-session analytics: intent distribution, retrieval latency, places
//! surfaced, degraded and cancelled turns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Analytics data for a single session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionAnalytics {
    /// Intent → count within this session.
    pub intent_distribution: HashMap<String, u64>,
    /// Retrieval latencies in milliseconds.
    pub retrieval_latencies_ms: Vec<f64>,
    /// Place ID → number of turns that surfaced it.
    pub surfaced_counts: HashMap<String, u64>,
    pub turns: u64,
    pub degraded_turns: u64,
    pub cancelled_turns: u64,
    pub broadened_turns: u64,
}

impl SessionAnalytics {
    /// Record an intent classification.
    pub fn record_intent(&mut self, intent: &str) {
        self.turns += 1;
        *self
            .intent_distribution
            .entry(intent.to_string())
            .or_insert(0) += 1;
    }

    /// Record a retrieval latency.
    pub fn record_latency(&mut self, latency_ms: f64) {
        self.retrieval_latencies_ms.push(latency_ms);
    }

    /// Record the places one turn surfaced.
    pub fn record_surfaced<'a>(&mut self, place_ids: impl IntoIterator<Item = &'a str>) {
        for id in place_ids {
            *self.surfaced_counts.entry(id.to_string()).or_insert(0) += 1;
        }
    }

    pub fn record_degraded(&mut self) {
        self.degraded_turns += 1;
    }

    pub fn record_cancelled(&mut self) {
        self.cancelled_turns += 1;
    }

    pub fn record_broadened(&mut self) {
        self.broadened_turns += 1;
    }

    /// Most frequently surfaced place IDs, count descending then id.
    pub fn most_surfaced(&self, limit: usize) -> Vec<(String, u64)> {
        let mut sorted: Vec<_> = self.surfaced_counts.clone().into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(limit);
        sorted
    }

    /// Average retrieval latency in milliseconds.
    pub fn avg_latency_ms(&self) -> f64 {
        if self.retrieval_latencies_ms.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.retrieval_latencies_ms.iter().sum();
        sum / self.retrieval_latencies_ms.len() as f64
    }
}
