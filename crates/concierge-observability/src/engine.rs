//! [`ObservabilityEngine`]: owns the degradation tracker and the turn log.

use concierge_core::config::ObservabilityConfig;
use concierge_core::errors::{ConciergeError, ConciergeResult};
use concierge_core::models::DegradationEvent;

use crate::degradation::DegradationTracker;
use crate::turn_log::{TurnLog, TurnLogEntry};

#[derive(Debug)]
pub struct ObservabilityEngine {
    pub degradation: DegradationTracker,
    pub turn_log: TurnLog,
}

impl ObservabilityEngine {
    pub fn new(config: &ObservabilityConfig) -> Self {
        Self {
            degradation: DegradationTracker::with_capacity(config.degradation_history),
            turn_log: TurnLog::with_capacity(config.turn_log_capacity),
        }
    }

    pub fn record_degradation(&mut self, event: DegradationEvent) {
        self.degradation.record(event);
    }

    pub fn mark_recovered(&mut self, component: &str) -> usize {
        self.degradation.mark_recovered(component)
    }

    pub fn record_turn(&mut self, entry: TurnLogEntry) {
        self.turn_log.record(entry);
    }

    /// JSON summary for health endpoints and shutdown logging.
    pub fn snapshot(&self) -> ConciergeResult<serde_json::Value> {
        let active: Vec<_> = self
            .degradation
            .active_degradations()
            .into_iter()
            .map(|t| &t.event)
            .collect();
        let active = serde_json::to_value(active).map_err(ConciergeError::SerializationError)?;

        Ok(serde_json::json!({
            "turns_logged": self.turn_log.count(),
            "avg_latency_ms": self.turn_log.avg_latency().as_millis() as u64,
            "p95_latency_ms": self.turn_log.latency_percentile(0.95).as_millis() as u64,
            "degraded_rate": self.turn_log.degraded_rate(),
            "degradations_total": self.degradation.total_recorded(),
            "active_degradations": active,
        }))
    }
}

impl Default for ObservabilityEngine {
    fn default() -> Self {
        Self::new(&ObservabilityConfig::default())
    }
}
