use serde::{Deserialize, Serialize};

/// The closed set of intents an utterance can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtteranceIntent {
    /// Fresh topical query ("find sushi downtown").
    NewTopic,
    /// Filter change on the current topic ("make it cheaper").
    FilterRefinement,
    /// Reference to a previously presented place ("the second one").
    Anaphora,
    /// Non-content interjection ("uh huh", "okay").
    Interjection,
    /// Explicit request to drop context ("start over").
    Reset,
}

impl UtteranceIntent {
    /// Total number of intent types.
    pub const COUNT: usize = 5;

    /// All variants for iteration.
    pub const ALL: [UtteranceIntent; 5] = [
        Self::NewTopic,
        Self::FilterRefinement,
        Self::Anaphora,
        Self::Interjection,
        Self::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewTopic => "new_topic",
            Self::FilterRefinement => "filter_refinement",
            Self::Anaphora => "anaphora",
            Self::Interjection => "interjection",
            Self::Reset => "reset",
        }
    }

    /// Whether a turn with this intent issues a vector search.
    ///
    /// Anaphora is served from the cached result list; interjections and
    /// resets never search.
    pub fn requires_search(&self) -> bool {
        matches!(self, Self::NewTopic | Self::FilterRefinement)
    }
}

impl std::fmt::Display for UtteranceIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
