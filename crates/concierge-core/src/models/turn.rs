use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conversation::{ConversationState, PlaceRef, TurnRecord};
use super::filters::FilterSet;
use super::phase::DialoguePhase;
use super::place::Coordinates;
use super::ranked::RankedResult;

/// All changes one completed turn makes to a conversation.
///
/// Built against `base_version`; a commit applies it in full or not at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TurnDelta {
    pub base_version: u64,
    pub turn: Option<TurnRecord>,
    pub filters: Option<FilterSet>,
    pub topic: Option<Option<String>>,
    pub results: Option<Vec<RankedResult>>,
    pub focused: Option<Option<PlaceRef>>,
    pub phase: Option<DialoguePhase>,
    pub pending_disambiguation: Option<bool>,
    pub presentation_cursor: Option<usize>,
    pub reference_location: Option<Option<Coordinates>>,
}

impl TurnDelta {
    pub fn against(state: &ConversationState) -> Self {
        Self {
            base_version: state.version,
            ..Self::default()
        }
    }

    pub fn with_turn(mut self, turn: TurnRecord) -> Self {
        self.turn = Some(turn);
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(Some(topic.into()));
        self
    }

    pub fn clear_topic(mut self) -> Self {
        self.topic = Some(None);
        self
    }

    pub fn with_results(mut self, results: Vec<RankedResult>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_focus(mut self, focused: Option<PlaceRef>) -> Self {
        self.focused = Some(focused);
        self
    }

    pub fn with_phase(mut self, phase: DialoguePhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_pending_disambiguation(mut self, pending: bool) -> Self {
        self.pending_disambiguation = Some(pending);
        self
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.presentation_cursor = Some(cursor);
        self
    }

    pub fn with_reference_location(mut self, location: Option<Coordinates>) -> Self {
        self.reference_location = Some(location);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.turn.is_none()
            && self.filters.is_none()
            && self.topic.is_none()
            && self.results.is_none()
            && self.focused.is_none()
            && self.phase.is_none()
            && self.pending_disambiguation.is_none()
            && self.presentation_cursor.is_none()
            && self.reference_location.is_none()
    }
}

impl ConversationState {
    /// A copy of this state with `delta` applied and the version bumped.
    ///
    /// Replacing the result list rebuilds `references`, and resets the
    /// presentation cursor and focus unless the delta sets them too.
    pub fn applied(&self, delta: TurnDelta, history_depth: usize, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.version = self.version + 1;
        next.last_committed_at = now;

        if let Some(mut turn) = delta.turn {
            next.turn_count += 1;
            turn.turn_index = next.turn_count;
            turn.committed_at = now;
            next.turns.push_back(turn);
            while next.turns.len() > history_depth.max(1) {
                next.turns.pop_front();
            }
        }

        if let Some(filters) = delta.filters {
            next.filters = filters.persistent();
        }
        if let Some(topic) = delta.topic {
            next.topic = topic;
        }
        if let Some(results) = delta.results {
            let turn_index = next.turn_count;
            next.references = results
                .iter()
                .enumerate()
                .map(|(position, r)| PlaceRef {
                    place_id: r.candidate.id.clone(),
                    turn_index,
                    position,
                })
                .collect();
            next.last_results = results;
            next.presentation_cursor = 0;
            next.focused = None;
        }
        if let Some(focused) = delta.focused {
            next.focused = focused;
        }
        if let Some(phase) = delta.phase {
            next.phase = phase;
        }
        if let Some(pending) = delta.pending_disambiguation {
            next.pending_disambiguation = pending;
        }
        if let Some(cursor) = delta.presentation_cursor {
            next.presentation_cursor = cursor.min(next.last_results.len());
        }
        if let Some(location) = delta.reference_location {
            next.reference_location = location;
        }
        next
    }
}
