use crate::models::DialoguePhase;

/// Session store and context manager errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("session {session_key} expired")]
    Expired { session_key: String },

    #[error("commit conflict on session {session_key}: expected version {expected}, found {actual:?}")]
    CommitConflict {
        session_key: String,
        expected: u64,
        actual: Option<u64>,
    },

    #[error("invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: DialoguePhase,
        to: DialoguePhase,
    },

    #[error("session store failure: {reason}")]
    StoreFailure { reason: String },
}
