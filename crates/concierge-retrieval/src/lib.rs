//! # concierge-retrieval
//!
//! Utterance → ranked places.
//! Query building (intent classification, filter extraction, reference
//! resolution), bounded vector retrieval with a broadening ladder, and
//! multi-factor ranking with deterministic ordering.

pub mod query;
pub mod ranking;
pub mod search;

pub use query::{classify, AmbiguousReference, BuildOutcome, QueryBuilder};
pub use ranking::{RankingContext, RankingEngine};
pub use search::{broaden, BroadeningStep, VectorRetrievalAdapter};
