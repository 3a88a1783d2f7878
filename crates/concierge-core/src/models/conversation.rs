use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::UtteranceIntent;

use super::filters::FilterSet;
use super::phase::DialoguePhase;
use super::place::{Coordinates, PlaceId};
use super::ranked::RankedResult;

/// Pointer to a place presented in an earlier turn. Never owns the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceRef {
    pub place_id: PlaceId,
    /// Turn in which the place was introduced (1-based).
    pub turn_index: u64,
    /// Position in that turn's ranked list (0-based).
    pub position: usize,
}

/// One committed turn in the bounded history ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_id: Uuid,
    /// Stamped on commit.
    pub turn_index: u64,
    pub utterance: String,
    pub intent: UtteranceIntent,
    pub result_count: usize,
    pub committed_at: DateTime<Utc>,
}

impl TurnRecord {
    pub fn new(utterance: impl Into<String>, intent: UtteranceIntent, result_count: usize) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            turn_index: 0,
            utterance: utterance.into(),
            intent,
            result_count,
            committed_at: Utc::now(),
        }
    }
}

/// Everything the engine remembers about one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_key: String,
    /// Bumped by every commit; compare-and-set guard.
    pub version: u64,
    pub turns: VecDeque<TurnRecord>,
    pub filters: FilterSet,
    /// Topical sentence of the last successful search turn.
    pub topic: Option<String>,
    pub last_results: Vec<RankedResult>,
    /// One entry per `last_results` element, same order.
    pub references: Vec<PlaceRef>,
    pub focused: Option<PlaceRef>,
    pub pending_disambiguation: bool,
    pub phase: DialoguePhase,
    pub reference_location: Option<Coordinates>,
    /// Number of `last_results` entries the speech layer has finished presenting.
    pub presentation_cursor: usize,
    pub turn_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_committed_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(session_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_key: session_key.into(),
            version: 0,
            turns: VecDeque::new(),
            filters: FilterSet::new(),
            topic: None,
            last_results: Vec::new(),
            references: Vec::new(),
            focused: None,
            pending_disambiguation: false,
            phase: DialoguePhase::Idle,
            reference_location: None,
            presentation_cursor: 0,
            turn_count: 0,
            created_at: now,
            last_committed_at: now,
        }
    }

    /// Time since the last commit (or creation).
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_committed_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_expired(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        self.idle_for(now) > timeout
    }

    /// The cached ranked result a reference points at.
    pub fn result_for(&self, reference: &PlaceRef) -> Option<&RankedResult> {
        self.last_results
            .get(reference.position)
            .filter(|r| r.candidate.id == reference.place_id)
            .or_else(|| {
                self.last_results
                    .iter()
                    .find(|r| r.candidate.id == reference.place_id)
            })
    }

    /// Ids of places surfaced by the last committed search turn.
    pub fn surfaced_ids(&self) -> Vec<PlaceId> {
        self.references.iter().map(|r| r.place_id.clone()).collect()
    }

    /// Results not yet presented.
    pub fn remaining_results(&self) -> &[RankedResult] {
        let from = self.presentation_cursor.min(self.last_results.len());
        &self.last_results[from..]
    }

    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.turns.back()
    }
}
