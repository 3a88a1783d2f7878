//! Reference detection and resolution against the held result list.

use concierge_core::errors::QueryError;
use concierge_core::models::{ConversationState, PlaceRef};

use super::lexicon;
use super::utterance::{normalize, Utterance};

/// Shortest normalized place name matched by name.
const MIN_NAME_CHARS: usize = 4;

/// A reference to a previously presented place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mention {
    /// "the third one", "number 2" (0-based).
    Position { index: usize, text: String },
    /// "the last one".
    Last { text: String },
    /// "that place", "tell me more".
    Deictic { text: String },
    /// Name of one or more held places, with their positions.
    Named { positions: Vec<usize>, text: String },
}

impl Mention {
    pub fn text(&self) -> &str {
        match self {
            Self::Position { text, .. }
            | Self::Last { text }
            | Self::Deictic { text }
            | Self::Named { text, .. } => text,
        }
    }

    /// Explicit list positions are references even when nothing is held.
    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Position { .. } | Self::Last { .. })
    }
}

/// Find a reference pattern in the utterance.
///
/// Positional mentions are always reported. Names and deictic phrases are
/// only considered while the state holds references.
pub fn detect(utterance: &Utterance, state: &ConversationState) -> Option<Mention> {
    if let Some(mention) = positional(utterance) {
        return Some(mention);
    }
    if state.references.is_empty() {
        return None;
    }
    if let Some(mention) = named(utterance, state) {
        return Some(mention);
    }
    if utterance.has_any(lexicon::MORE_LIKE_THAT) {
        return None;
    }
    utterance
        .first_of(lexicon::DEICTIC)
        .map(|text| Mention::Deictic {
            text: text.to_string(),
        })
}

/// Resolve a mention to a held reference.
pub fn resolve(mention: &Mention, state: &ConversationState) -> Result<PlaceRef, QueryError> {
    let held = state.references.len();
    let ambiguous = || QueryError::AmbiguousReference {
        mention: mention.text().to_string(),
        held,
    };

    match mention {
        Mention::Position { index, .. } => state.references.get(*index).cloned().ok_or_else(ambiguous),
        Mention::Last { .. } => state.references.last().cloned().ok_or_else(ambiguous),
        Mention::Named { positions, .. } => match positions.as_slice() {
            [only] => state.references.get(*only).cloned().ok_or_else(ambiguous),
            _ => Err(ambiguous()),
        },
        Mention::Deictic { .. } => {
            if let Some(focused) = &state.focused {
                if state.references.contains(focused) {
                    return Ok(focused.clone());
                }
            }
            match state.references.as_slice() {
                [only] => Ok(only.clone()),
                _ => Err(ambiguous()),
            }
        }
    }
}

fn positional(utterance: &Utterance) -> Option<Mention> {
    let tokens = utterance.tokens();
    for (i, token) in tokens.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| tokens[p].as_str());
        let next = tokens.get(i + 1).map(String::as_str);
        let anchored = matches!(prev, Some("the") | Some("that"))
            || next.is_some_and(|n| lexicon::REFERENT_NOUNS.contains(&n));

        if token == "last" && anchored {
            return Some(Mention::Last {
                text: span_text(tokens, i, next.is_some_and(|n| lexicon::REFERENT_NOUNS.contains(&n))),
            });
        }
        if let Some((_, index)) = lexicon::ORDINALS.iter().find(|(w, _)| *w == token.as_str()) {
            if anchored {
                return Some(Mention::Position {
                    index: *index,
                    text: span_text(tokens, i, next.is_some_and(|n| lexicon::REFERENT_NOUNS.contains(&n))),
                });
            }
        }
        if lexicon::NUMBER_MARKERS.contains(&token.as_str()) {
            let number = next.and_then(|n| {
                n.parse::<usize>().ok().or_else(|| {
                    lexicon::CARDINALS
                        .iter()
                        .find(|(w, _)| *w == n)
                        .map(|(_, v)| *v)
                })
            });
            if let Some(index) = number.and_then(|n| n.checked_sub(1)) {
                return Some(Mention::Position {
                    index,
                    text: format!("{} {}", token, next.unwrap_or_default()),
                });
            }
        }
    }
    None
}

fn span_text(tokens: &[String], at: usize, with_noun: bool) -> String {
    let end = if with_noun { at + 2 } else { at + 1 };
    let start = if at > 0 && matches!(tokens[at - 1].as_str(), "the" | "that") {
        at - 1
    } else {
        at
    };
    tokens[start..end.min(tokens.len())].join(" ")
}

fn named(utterance: &Utterance, state: &ConversationState) -> Option<Mention> {
    let mut positions = Vec::new();
    let mut text = String::new();
    for (position, reference) in state.references.iter().enumerate() {
        let Some(result) = state.result_for(reference) else {
            continue;
        };
        let normalized = normalize(result.name());
        let name = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        let name = name.strip_prefix("the ").unwrap_or(&name);
        if name.len() >= MIN_NAME_CHARS && utterance.has(name) {
            positions.push(position);
            if text.is_empty() {
                text = name.to_string();
            }
        }
    }
    (!positions.is_empty()).then_some(Mention::Named { positions, text })
}
