//! Session lookup outcomes and the per-session turn permit.

use tokio::sync::OwnedMutexGuard;

use concierge_core::models::ConversationState;

/// How [`ContextManager::open`](crate::ContextManager::open) found the session.
#[derive(Debug, Clone, PartialEq)]
pub enum StateLookup {
    /// Live state from an earlier turn.
    Existing(ConversationState),
    /// No state was stored; a fresh one was created.
    Created(ConversationState),
    /// The stored state had expired and was replaced by a fresh one.
    Reset(ConversationState),
}

impl StateLookup {
    pub fn state(&self) -> &ConversationState {
        match self {
            Self::Existing(s) | Self::Created(s) | Self::Reset(s) => s,
        }
    }

    pub fn into_state(self) -> ConversationState {
        match self {
            Self::Existing(s) | Self::Created(s) | Self::Reset(s) => s,
        }
    }

    /// Whether earlier context was lost to expiry.
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset(_))
    }
}

/// Exclusive right to run one turn on a session. Released on drop.
#[derive(Debug)]
pub struct TurnPermit {
    session_key: String,
    _guard: OwnedMutexGuard<()>,
}

impl TurnPermit {
    pub(crate) fn new(session_key: &str, guard: OwnedMutexGuard<()>) -> Self {
        Self {
            session_key: session_key.to_string(),
            _guard: guard,
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }
}
