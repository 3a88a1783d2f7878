/// Errors raised while turning an utterance into a structured query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("ambiguous reference \"{mention}\" against {held} held places")]
    AmbiguousReference { mention: String, held: usize },

    #[error("invalid value for filter {kind}: {value} ({reason})")]
    InvalidFilterValue {
        kind: String,
        value: String,
        reason: String,
    },
}
