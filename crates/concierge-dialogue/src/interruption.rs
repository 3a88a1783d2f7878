//! Interruption & recovery: classify what the caller said over an in-flight
//! turn and decide whether to restart, refine or resume.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use concierge_core::errors::ConciergeResult;
use concierge_core::models::{DialoguePhase, PhaseTracker, RecoveryDecision};
use concierge_core::traits::{Cancellable, CancellationToken};
use concierge_observability::tracing_setup::events;
use concierge_retrieval::classify;
use concierge_session::ContextManager;

/// How one interruption was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interruption {
    pub decision: RecoveryDecision,
    /// Whether an in-flight turn was cancelled.
    pub cancelled: bool,
    /// Phase walk of the interrupted turn, ending in `Searching` for a
    /// re-run or `Presenting` for a resume.
    pub phases: Vec<DialoguePhase>,
}

/// Owns the cancellation token of each session's in-flight turn.
pub struct InterruptionController {
    sessions: Arc<ContextManager>,
    in_flight: DashMap<String, CancellationToken>,
}

impl InterruptionController {
    pub fn new(sessions: Arc<ContextManager>) -> Self {
        Self {
            sessions,
            in_flight: DashMap::new(),
        }
    }

    /// Hand out the token for a turn that is starting.
    pub fn register(&self, key: &str) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.in_flight.insert(key.to_string(), token.clone()) {
            // A turn that never finished is superseded.
            previous.cancel();
        }
        token
    }

    /// Forget `token` once its turn has finished. A newer turn's token is kept.
    pub fn finish(&self, key: &str, token: &CancellationToken) {
        self.in_flight.remove_if(key, |_, current| current.same_as(token));
    }

    /// Cancel the in-flight turn, if any. Returns whether one was cancelled.
    pub fn cancel(&self, key: &str) -> bool {
        match self.in_flight.get(key) {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Decide how to recover from `partial_utterance`.
    ///
    /// Classification runs against committed state, so a cancelled turn's
    /// partial work never influences it. Every decision except `Resume`
    /// cancels the in-flight turn.
    pub fn on_interrupt(
        &self,
        key: &str,
        partial_utterance: &str,
    ) -> ConciergeResult<RecoveryDecision> {
        self.interrupt(key, partial_utterance).map(|i| i.decision)
    }

    /// [`on_interrupt`](Self::on_interrupt), also reporting cancellation and
    /// the phase walk.
    ///
    /// The interrupted turn is `Searching` if one is in flight, otherwise
    /// the response being spoken is `Presenting`. Either way it passes
    /// through `Interrupted` before the decision applies.
    pub fn interrupt(&self, key: &str, partial_utterance: &str) -> ConciergeResult<Interruption> {
        let state = self.sessions.get_state(key)?;
        let intent = classify(partial_utterance, &state);
        let decision = RecoveryDecision::for_intent(intent);

        let start = if self.is_in_flight(key) {
            DialoguePhase::Searching
        } else {
            DialoguePhase::Presenting
        };
        let mut phases = PhaseTracker::new(start);
        phases.transition(DialoguePhase::Interrupted)?;

        let cancelled = decision.cancels_in_flight() && self.cancel(key);
        if cancelled {
            events::turn_cancelled(key, decision.as_str());
            self.sessions.record_analytics(key, |a| a.record_cancelled());
        }

        phases.transition(match decision {
            RecoveryDecision::Resume => DialoguePhase::Presenting,
            RecoveryDecision::Restart | RecoveryDecision::Refine => DialoguePhase::Searching,
        })?;
        debug!(
            session = key,
            intent = %intent,
            decision = decision.as_str(),
            cancelled,
            phases = ?phases.history(),
            "interruption classified"
        );
        Ok(Interruption {
            decision,
            cancelled,
            phases: phases.history().to_vec(),
        })
    }
}
