mod conversation;
mod degradation_event;
mod filters;
mod phase;
mod place;
mod query;
mod ranked;
mod recovery;
mod turn;

pub use conversation::{ConversationState, PlaceRef, TurnRecord};
pub use degradation_event::DegradationEvent;
pub use filters::{FilterKind, FilterSet, FilterValue, PriceLevel};
pub use phase::{DialoguePhase, PhaseTracker};
pub use place::{Coordinates, OpeningHours, PlaceCandidate, PlaceId, PlaceMetadata};
pub use query::{SortMode, StructuredQuery};
pub use ranked::{FactorWeights, RankedResult, RankingFactor};
pub use recovery::RecoveryDecision;
pub use turn::TurnDelta;
