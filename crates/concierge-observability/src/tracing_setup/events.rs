//! Structured log events for key dialogue operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// An extracted filter value failed validation and was dropped.
pub fn filter_dropped(session: &str, kind: &str, value: &str, reason: &str) {
    tracing::warn!(
        event = "filter_dropped",
        session = %session,
        kind = %kind,
        value = %value,
        reason = %reason,
        "filter value dropped"
    );
}

/// A session's context was lost to inactivity and replaced.
pub fn session_expired(session: &str) {
    tracing::info!(
        event = "session_expired",
        session = %session,
        "session context reset after expiry"
    );
}

/// A collaborator failed and the turn was served in a degraded mode.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// An in-flight turn was superseded by an interruption.
pub fn turn_cancelled(session: &str, decision: &str) {
    tracing::info!(
        event = "turn_cancelled",
        session = %session,
        decision = %decision,
        "in-flight turn cancelled"
    );
}

/// An empty result was retried with relaxed filters.
pub fn filters_broadened(session: &str, step: &str, results: usize) {
    tracing::info!(
        event = "filters_broadened",
        session = %session,
        step = %step,
        results = results,
        "filters broadened after empty result"
    );
}
