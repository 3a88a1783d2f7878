//! # concierge-observability
//!
//! Structured tracing setup, span macros and log events, degradation
//! tracking with recovery status, and a bounded per-turn log.

pub mod degradation;
pub mod engine;
pub mod tracing_setup;
pub mod turn_log;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use engine::ObservabilityEngine;
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
pub use turn_log::{TurnLog, TurnLogEntry};
