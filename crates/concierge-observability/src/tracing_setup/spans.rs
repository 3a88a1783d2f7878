//! Span definitions per operation: turn, retrieval, ranking, interruption.

/// Create a span covering one dialogue turn.
#[macro_export]
macro_rules! turn_span {
    ($session:expr) => {
        tracing::info_span!("concierge.turn", session = %$session, intent = tracing::field::Empty)
    };
}

/// Create a vector retrieval span.
#[macro_export]
macro_rules! retrieval_span {
    ($backend:expr, $top_k:expr) => {
        tracing::info_span!("concierge.retrieval", backend = %$backend, top_k = $top_k)
    };
}

/// Create a ranking span.
#[macro_export]
macro_rules! ranking_span {
    ($candidates:expr) => {
        tracing::debug_span!("concierge.ranking", candidates = $candidates)
    };
}

/// Create an interruption handling span.
#[macro_export]
macro_rules! interrupt_span {
    ($session:expr) => {
        tracing::info_span!("concierge.interrupt", session = %$session, decision = tracing::field::Empty)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const TURN: &str = "concierge.turn";
    pub const RETRIEVAL: &str = "concierge.retrieval";
    pub const RANKING: &str = "concierge.ranking";
    pub const INTERRUPT: &str = "concierge.interrupt";
}
