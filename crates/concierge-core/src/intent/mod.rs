//! Utterance intent taxonomy.

mod taxonomy;

pub use taxonomy::UtteranceIntent;
