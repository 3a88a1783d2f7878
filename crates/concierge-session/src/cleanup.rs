//! Idle session cleanup and the background expiry sweeper.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use concierge_core::errors::ConciergeResult;

use crate::manager::ContextManager;

/// Remove sessions idle past `session.timeout_secs`. Returns how many were removed.
pub fn cleanup_idle_sessions(manager: &ContextManager) -> ConciergeResult<usize> {
    manager.expire_idle().map(|expired| expired.len())
}

/// Run [`cleanup_idle_sessions`] every `session.sweep_interval_secs` until
/// the handle is aborted.
pub fn spawn_expiry_sweeper(manager: Arc<ContextManager>) -> JoinHandle<()> {
    let period = manager.config().sweep_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match cleanup_idle_sessions(&manager) {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "expiry sweep"),
                Err(e) => warn!(error = %e, "expiry sweep failed"),
            }
        }
    })
}
