//! What a turn or an interruption produced, handed back to the speech layer.

use concierge_core::models::{DegradationEvent, DialoguePhase, RankedResult, RecoveryDecision};
use concierge_retrieval::BroadeningStep;

use crate::presentation::ResponseChunk;

/// Result of one [`DialogueEngine::handle_turn`](crate::DialogueEngine::handle_turn).
///
/// `context_reset` tells the caller the previous conversation had expired
/// and this turn started from fresh state.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A ranked list was committed.
    Results {
        results: Vec<RankedResult>,
        /// Set when the list came from a relaxed filter set.
        broadened: Option<BroadeningStep>,
        chunks: Vec<ResponseChunk>,
        context_reset: bool,
    },
    /// Drill-down into a held place, served without retrieval.
    Details {
        place: RankedResult,
        chunks: Vec<ResponseChunk>,
        context_reset: bool,
    },
    /// A reference could not be resolved; the caller is asked to pick.
    Disambiguation {
        mention: String,
        held: usize,
        chunks: Vec<ResponseChunk>,
        context_reset: bool,
    },
    /// The backend was unavailable. Nothing was committed.
    Degraded {
        cached: Vec<RankedResult>,
        event: DegradationEvent,
        chunks: Vec<ResponseChunk>,
        context_reset: bool,
    },
    /// Every broadening step came back empty.
    NoResults {
        chunks: Vec<ResponseChunk>,
        context_reset: bool,
    },
    /// Context cleared on request.
    Reset { chunks: Vec<ResponseChunk> },
    /// Interjection outside an interruption.
    Acknowledged {
        chunks: Vec<ResponseChunk>,
        context_reset: bool,
    },
    /// Superseded by an interruption. Nothing was committed.
    Cancelled,
}

impl TurnOutcome {
    pub fn chunks(&self) -> &[ResponseChunk] {
        match self {
            Self::Results { chunks, .. }
            | Self::Details { chunks, .. }
            | Self::Disambiguation { chunks, .. }
            | Self::Degraded { chunks, .. }
            | Self::NoResults { chunks, .. }
            | Self::Reset { chunks }
            | Self::Acknowledged { chunks, .. } => chunks,
            Self::Cancelled => &[],
        }
    }

    pub fn context_reset(&self) -> bool {
        match self {
            Self::Results { context_reset, .. }
            | Self::Details { context_reset, .. }
            | Self::Disambiguation { context_reset, .. }
            | Self::Degraded { context_reset, .. }
            | Self::NoResults { context_reset, .. }
            | Self::Acknowledged { context_reset, .. } => *context_reset,
            Self::Reset { .. } | Self::Cancelled => false,
        }
    }

    /// Places this outcome presents, in order.
    pub fn places(&self) -> &[RankedResult] {
        match self {
            Self::Results { results, .. } => results,
            Self::Degraded { cached, .. } => cached,
            Self::Details { place, .. } => std::slice::from_ref(place),
            _ => &[],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Results { .. } => "results",
            Self::Details { .. } => "details",
            Self::Disambiguation { .. } => "disambiguation",
            Self::Degraded { .. } => "degraded",
            Self::NoResults { .. } => "no_results",
            Self::Reset { .. } => "reset",
            Self::Acknowledged { .. } => "acknowledged",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Result of [`DialogueEngine::interrupt`](crate::DialogueEngine::interrupt).
///
/// `phases` is the interrupted turn's walk through `Interrupted`.
#[derive(Debug, Clone, PartialEq)]
pub enum InterruptOutcome {
    /// Presentation continues from the cursor.
    Resumed {
        remaining: Vec<RankedResult>,
        chunks: Vec<ResponseChunk>,
        phases: Vec<DialoguePhase>,
    },
    /// The in-flight turn was cancelled and the interruption ran as a turn.
    Rerun {
        decision: RecoveryDecision,
        outcome: TurnOutcome,
        phases: Vec<DialoguePhase>,
    },
}

impl InterruptOutcome {
    pub fn decision(&self) -> RecoveryDecision {
        match self {
            Self::Resumed { .. } => RecoveryDecision::Resume,
            Self::Rerun { decision, .. } => *decision,
        }
    }

    pub fn chunks(&self) -> &[ResponseChunk] {
        match self {
            Self::Resumed { chunks, .. } => chunks,
            Self::Rerun { outcome, .. } => outcome.chunks(),
        }
    }

    pub fn phases(&self) -> &[DialoguePhase] {
        match self {
            Self::Resumed { phases, .. } | Self::Rerun { phases, .. } => phases,
        }
    }
}
