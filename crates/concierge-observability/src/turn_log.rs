//! Per-turn performance log: session, intent, latency, result count, and
//! whether the turn was degraded, broadened or cancelled.

use std::collections::VecDeque;
use std::time::Duration;

use concierge_core::intent::UtteranceIntent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnLogEntry {
    pub session_key: String,
    /// `None` when the turn was cancelled before classification finished.
    pub intent: Option<UtteranceIntent>,
    pub latency: Duration,
    pub result_count: usize,
    pub degraded: bool,
    pub broadened: bool,
    pub cancelled: bool,
    pub timestamp_epoch_ms: i64,
}

impl TurnLogEntry {
    pub fn new(
        session_key: impl Into<String>,
        intent: Option<UtteranceIntent>,
        latency: Duration,
        result_count: usize,
    ) -> Self {
        Self {
            session_key: session_key.into(),
            intent,
            latency,
            result_count,
            degraded: false,
            broadened: false,
            cancelled: false,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn broadened(mut self, broadened: bool) -> Self {
        self.broadened = broadened;
        self
    }

    pub fn cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }
}

/// Ring buffer of the most recent turns.
#[derive(Debug, Clone)]
pub struct TurnLog {
    entries: VecDeque<TurnLogEntry>,
    capacity: usize,
}

impl TurnLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, entry: TurnLogEntry) {
        tracing::debug!(
            event = "turn_logged",
            session = %entry.session_key,
            intent = ?entry.intent,
            latency_ms = entry.latency.as_millis() as u64,
            result_count = entry.result_count,
            degraded = entry.degraded,
            broadened = entry.broadened,
            cancelled = entry.cancelled,
            "turn logged"
        );

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &TurnLogEntry> {
        self.entries.iter()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Latency at percentile `p` in `[0, 1]`.
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let mut latencies: Vec<Duration> = self.entries.iter().map(|e| e.latency).collect();
        latencies.sort();
        let idx = ((p.clamp(0.0, 1.0) * (latencies.len() - 1) as f64).round() as usize)
            .min(latencies.len() - 1);
        latencies[idx]
    }

    /// Share of logged turns served degraded.
    pub fn degraded_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let degraded = self.entries.iter().filter(|e| e.degraded).count();
        degraded as f64 / self.entries.len() as f64
    }
}

impl Default for TurnLog {
    fn default() -> Self {
        Self::with_capacity(concierge_core::config::defaults::DEFAULT_TURN_LOG_CAPACITY)
    }
}
