use serde::{Deserialize, Serialize};

use crate::intent::UtteranceIntent;

/// What to do with an in-flight turn when the caller speaks over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryDecision {
    /// Discard the in-flight turn and run a fresh query.
    Restart,
    /// Merge the correction into the active filters and re-run the topic.
    Refine,
    /// Keep presenting the previous list from where it stopped.
    Resume,
}

impl RecoveryDecision {
    pub fn for_intent(intent: UtteranceIntent) -> Self {
        match intent {
            UtteranceIntent::NewTopic | UtteranceIntent::Reset | UtteranceIntent::Anaphora => {
                Self::Restart
            }
            UtteranceIntent::FilterRefinement => Self::Refine,
            UtteranceIntent::Interjection => Self::Resume,
        }
    }

    /// Whether the in-flight turn must be cancelled.
    pub fn cancels_in_flight(&self) -> bool {
        !matches!(self, Self::Resume)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restart => "restart",
            Self::Refine => "refine",
            Self::Resume => "resume",
        }
    }
}
