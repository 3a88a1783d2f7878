//! # concierge-dialogue
//!
//! Turn orchestration for the voice concierge.
//! [`DialogueEngine`] runs each utterance through the query builder, the
//! vector adapter and the ranking engine, commits the result through the
//! context manager, and assembles the spoken response.
//! [`InterruptionController`] decides how to recover when the caller speaks
//! over a turn.

pub mod engine;
pub mod interruption;
pub mod outcome;
pub mod presentation;

pub use engine::{DialogueEngine, VECTOR_STORE_COMPONENT};
pub use interruption::{Interruption, InterruptionController};
pub use outcome::{InterruptOutcome, TurnOutcome};
pub use presentation::{spoken_text, Presenter, ResponseChunk};
