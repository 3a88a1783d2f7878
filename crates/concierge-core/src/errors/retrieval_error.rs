/// Retrieval subsystem errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrievalError {
    #[error("backend {backend} unavailable after {attempts} attempts: {reason}")]
    BackendUnavailable {
        backend: String,
        attempts: u32,
        reason: String,
    },

    #[error("backend {backend} failed: {reason}")]
    BackendFailure { backend: String, reason: String },

    #[error("invalid top_k {top_k}: must be between 1 and {max}")]
    InvalidTopK { top_k: usize, max: usize },
}

impl RetrievalError {
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}
