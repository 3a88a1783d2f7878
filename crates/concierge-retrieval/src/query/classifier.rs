//! Utterance intent classification. Pure: the same utterance and state
//! always yield the same intent.

use concierge_core::intent::UtteranceIntent;
use concierge_core::models::ConversationState;

use super::anaphora;
use super::extraction::{self, Extraction};
use super::lexicon;
use super::utterance::Utterance;

/// Classify a raw utterance against the current conversation state.
pub fn classify(utterance: &str, state: &ConversationState) -> UtteranceIntent {
    let parsed = Utterance::parse(utterance);
    let extraction = extraction::extract(&parsed);
    classify_parsed(&parsed, &extraction, state)
}

/// First matching rule wins:
/// reset phrase → reference pattern → interjection → refinement → new topic.
pub(crate) fn classify_parsed(
    utterance: &Utterance,
    extraction: &Extraction,
    state: &ConversationState,
) -> UtteranceIntent {
    if utterance.has_any(lexicon::RESET_PHRASES) {
        return UtteranceIntent::Reset;
    }

    if anaphora::detect(utterance, state).is_some() {
        return UtteranceIntent::Anaphora;
    }

    if is_interjection(utterance) {
        return UtteranceIntent::Interjection;
    }

    if state.topic.is_some() && extraction.mentions_filters() && !extraction.topical {
        return UtteranceIntent::FilterRefinement;
    }

    UtteranceIntent::NewTopic
}

fn is_interjection(utterance: &Utterance) -> bool {
    utterance
        .tokens()
        .iter()
        .all(|t| lexicon::INTERJECTION_SET.contains(t.as_str()))
}
