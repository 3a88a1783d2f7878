//! Error taxonomy. One enum per subsystem, wrapped by [`ConciergeError`].

mod config_error;
mod query_error;
mod retrieval_error;
mod session_error;

pub use config_error::ConfigError;
pub use query_error::QueryError;
pub use retrieval_error::RetrievalError;
pub use session_error::SessionError;

/// Result alias used across the workspace.
pub type ConciergeResult<T> = Result<T, ConciergeError>;

/// Top-level error for every fallible Concierge operation.
#[derive(Debug, thiserror::Error)]
pub enum ConciergeError {
    #[error("query error: {0}")]
    QueryError(#[from] QueryError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("session error: {0}")]
    SessionError(#[from] SessionError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("turn cancelled for session {session_key}")]
    Cancelled { session_key: String },
}

impl ConciergeError {
    /// Whether the caller can recover without operator intervention.
    ///
    /// Ambiguous references, backend outages, expired sessions, dropped filter
    /// values and cancellations all have a defined recovery path.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::QueryError(_) => true,
            Self::RetrievalError(e) => e.is_backend_unavailable(),
            Self::SessionError(e) => matches!(e, SessionError::Expired { .. }),
            Self::Cancelled { .. } => true,
            Self::ConfigError(_) | Self::SerializationError(_) => false,
        }
    }
}
