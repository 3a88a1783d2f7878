use serde::{Deserialize, Serialize};

use crate::errors::SessionError;

/// Per-session dialogue state machine.
///
/// ```text
/// Idle → AwaitingQuery → Searching → Presenting → (Idle | AwaitingDisambiguation | Interrupted)
/// AwaitingDisambiguation → Searching
/// Interrupted → Searching | Presenting
/// Searching → Interrupted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    #[default]
    Idle,
    AwaitingQuery,
    Searching,
    Presenting,
    AwaitingDisambiguation,
    Interrupted,
}

impl DialoguePhase {
    pub fn can_transition_to(&self, next: DialoguePhase) -> bool {
        use DialoguePhase::*;
        matches!(
            (self, next),
            (Idle, AwaitingQuery)
                | (AwaitingQuery, Searching)
                | (Searching, Presenting)
                | (Searching, Interrupted)
                | (Presenting, Idle)
                | (Presenting, AwaitingDisambiguation)
                | (Presenting, Interrupted)
                | (AwaitingDisambiguation, Searching)
                | (Interrupted, Searching)
                | (Interrupted, Presenting)
        )
    }

    /// Phases that may be stored in committed state.
    pub fn is_committable(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Presenting | Self::AwaitingDisambiguation
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingQuery => "awaiting_query",
            Self::Searching => "searching",
            Self::Presenting => "presenting",
            Self::AwaitingDisambiguation => "awaiting_disambiguation",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Validates the phase walk of one in-flight turn.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    current: DialoguePhase,
    history: Vec<DialoguePhase>,
}

impl PhaseTracker {
    pub fn new(start: DialoguePhase) -> Self {
        Self {
            current: start,
            history: vec![start],
        }
    }

    pub fn current(&self) -> DialoguePhase {
        self.current
    }

    pub fn history(&self) -> &[DialoguePhase] {
        &self.history
    }

    pub fn transition(&mut self, next: DialoguePhase) -> Result<DialoguePhase, SessionError> {
        if !self.current.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        self.current = next;
        self.history.push(next);
        Ok(next)
    }

    /// Walk from the committed phase to `Searching`.
    pub fn begin_search(&mut self) -> Result<DialoguePhase, SessionError> {
        loop {
            let next = match self.current {
                DialoguePhase::Searching => return Ok(DialoguePhase::Searching),
                DialoguePhase::Idle => DialoguePhase::AwaitingQuery,
                DialoguePhase::Presenting => DialoguePhase::Idle,
                DialoguePhase::AwaitingQuery
                | DialoguePhase::AwaitingDisambiguation
                | DialoguePhase::Interrupted => DialoguePhase::Searching,
            };
            self.transition(next)?;
        }
    }
}
