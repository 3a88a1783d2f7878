//! Cooperative turn cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{ConciergeError, ConciergeResult};

/// Checked at turn checkpoints to see whether an interruption superseded the turn.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    fn cancel(&self);

    /// `Err(Cancelled)` once cancellation has been requested.
    fn checkpoint(&self, session_key: &str) -> ConciergeResult<()> {
        if self.is_cancelled() {
            Err(ConciergeError::Cancelled {
                session_key: session_key.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Shared flag handed to one in-flight turn. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether both handles point at the same turn.
    pub fn same_as(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
