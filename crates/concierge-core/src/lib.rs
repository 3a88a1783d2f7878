//! # concierge-core
//!
//! Foundation crate for the Concierge dialogue engine.
//! Defines the conversation and place models, traits for the external
//! collaborators (vector store, session store), errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod intent;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ConciergeConfig;
pub use errors::{ConciergeError, ConciergeResult};
pub use intent::UtteranceIntent;
pub use models::{
    ConversationState, DialoguePhase, FilterKind, FilterSet, FilterValue, PlaceCandidate,
    PlaceMetadata, PlaceRef, RankedResult, StructuredQuery,
};
