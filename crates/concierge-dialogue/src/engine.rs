//! DialogueEngine: one utterance in, one committed turn (or none) out.
//!
//! open state → build query → retrieve (broaden when empty) → rank → commit.
//! The turn's cancellation token is checked before and after retrieval,
//! before and after ranking, and before commit. A cancelled turn commits
//! nothing.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, Instrument};

use concierge_core::config::ConciergeConfig;
use concierge_core::errors::{ConciergeError, ConciergeResult, QueryError, SessionError};
use concierge_core::intent::UtteranceIntent;
use concierge_core::models::{
    ConversationState, DegradationEvent, DialoguePhase, FilterSet, PhaseTracker, PlaceCandidate,
    PlaceRef, RankedResult, RecoveryDecision, StructuredQuery, TurnDelta, TurnRecord,
};
use concierge_core::traits::{Cancellable, CancellationToken, IVectorStore};
use concierge_observability::tracing_setup::events;
use concierge_observability::{
    interrupt_span, ranking_span, retrieval_span, turn_span, ObservabilityEngine, TurnLogEntry,
};
use concierge_retrieval::{
    broaden, AmbiguousReference, BuildOutcome, QueryBuilder, RankingContext,
    RankingEngine, VectorRetrievalAdapter,
};
use concierge_session::{ContextManager, StateLookup};

use crate::interruption::{Interruption, InterruptionController};
use crate::outcome::{InterruptOutcome, TurnOutcome};
use crate::presentation::Presenter;

/// Component name used for vector backend degradations.
pub const VECTOR_STORE_COMPONENT: &str = "vector_store";

/// What the turn log needs to know about a finished turn.
#[derive(Debug, Default)]
struct TurnReport {
    intent: Option<UtteranceIntent>,
    degraded: bool,
    broadened: bool,
}

/// Per-turn inputs shared by the outcome paths.
struct Turn<'a> {
    key: &'a str,
    utterance: &'a str,
    state: &'a ConversationState,
    token: &'a CancellationToken,
    context_reset: bool,
}

impl Turn<'_> {
    fn checkpoint(&self) -> ConciergeResult<()> {
        self.token.checkpoint(self.key)
    }

    fn record(&self, intent: UtteranceIntent, result_count: usize) -> TurnRecord {
        TurnRecord::new(self.utterance, intent, result_count)
    }
}

pub struct DialogueEngine {
    config: ConciergeConfig,
    builder: QueryBuilder,
    adapter: VectorRetrievalAdapter,
    ranker: RankingEngine,
    sessions: Arc<ContextManager>,
    interruptions: InterruptionController,
    presenter: Presenter,
    observability: Arc<Mutex<ObservabilityEngine>>,
}

impl DialogueEngine {
    pub fn new(
        config: ConciergeConfig,
        store: Arc<dyn IVectorStore>,
        sessions: Arc<ContextManager>,
    ) -> ConciergeResult<Self> {
        config.validate()?;
        Ok(Self {
            builder: QueryBuilder::new(&config),
            adapter: VectorRetrievalAdapter::new(store, config.retrieval.clone()),
            ranker: RankingEngine::new(config.ranking.clone()),
            interruptions: InterruptionController::new(Arc::clone(&sessions)),
            presenter: Presenter::new(config.dialogue.clone()),
            observability: Arc::new(Mutex::new(ObservabilityEngine::new(&config.observability))),
            sessions,
            config,
        })
    }

    /// An engine over a fresh in-memory session store.
    pub fn in_memory(config: ConciergeConfig, store: Arc<dyn IVectorStore>) -> ConciergeResult<Self> {
        let sessions = Arc::new(ContextManager::in_memory(config.session.clone()));
        Self::new(config, store, sessions)
    }

    /// Pin the local time used for open-now filtering.
    pub fn at_minute_of_day(mut self, minute: u16) -> Self {
        self.adapter = self.adapter.at_minute_of_day(minute);
        self
    }

    /// Share an observability engine with other components.
    pub fn with_observability(mut self, observability: Arc<Mutex<ObservabilityEngine>>) -> Self {
        self.observability = observability;
        self
    }

    pub fn config(&self) -> &ConciergeConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<ContextManager> {
        &self.sessions
    }

    pub fn interruptions(&self) -> &InterruptionController {
        &self.interruptions
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn observability(&self) -> Arc<Mutex<ObservabilityEngine>> {
        Arc::clone(&self.observability)
    }

    /// Run one turn. Waits for any turn already running on the session.
    pub async fn handle_turn(&self, key: &str, utterance: &str) -> ConciergeResult<TurnOutcome> {
        self.run_turn(key, utterance).instrument(turn_span!(key)).await
    }

    /// The caller spoke over the current response.
    ///
    /// `Resume` continues the committed list from the presentation cursor.
    /// `Restart` and `Refine` cancel the in-flight turn and run the partial
    /// utterance as a fresh turn against the last committed state.
    pub async fn interrupt(&self, key: &str, partial: &str) -> ConciergeResult<InterruptOutcome> {
        async {
            let Interruption {
                decision, phases, ..
            } = self.interruptions.interrupt(key, partial)?;
            tracing::Span::current().record("decision", decision.as_str());

            match decision {
                RecoveryDecision::Resume => {
                    let state = self.sessions.get_state(key)?;
                    let remaining = state.remaining_results().to_vec();
                    let chunks = self.presenter.resume(&remaining);
                    Ok(InterruptOutcome::Resumed {
                        remaining,
                        chunks,
                        phases,
                    })
                }
                RecoveryDecision::Restart | RecoveryDecision::Refine => {
                    let outcome = self.handle_turn(key, partial).await?;
                    Ok(InterruptOutcome::Rerun {
                        decision,
                        outcome,
                        phases,
                    })
                }
            }
        }
        .instrument(interrupt_span!(key))
        .await
    }

    async fn run_turn(&self, key: &str, utterance: &str) -> ConciergeResult<TurnOutcome> {
        let _permit = self.sessions.begin_turn(key).await;
        let token = self.interruptions.register(key);
        let started = Instant::now();
        let mut report = TurnReport::default();

        let result = self.execute(key, utterance, &token, &mut report).await;
        self.interruptions.finish(key, &token);

        let outcome = match result {
            Err(ConciergeError::Cancelled { .. }) => {
                events::turn_cancelled(key, "superseded");
                Ok(TurnOutcome::Cancelled)
            }
            other => other,
        };
        if let Ok(outcome) = &outcome {
            self.log_turn(key, &report, started.elapsed(), outcome);
        }
        outcome
    }

    async fn execute(
        &self,
        key: &str,
        utterance: &str,
        token: &CancellationToken,
        report: &mut TurnReport,
    ) -> ConciergeResult<TurnOutcome> {
        let lookup = self.sessions.open(key)?;
        let context_reset = lookup.is_reset();
        if context_reset {
            events::session_expired(key);
        }
        let state = lookup.into_state();
        let turn = Turn {
            key,
            utterance,
            state: &state,
            token,
            context_reset,
        };
        turn.checkpoint()?;

        let query = match self.builder.build(utterance, &state) {
            BuildOutcome::Ambiguous(ambiguous) => {
                self.log_dropped(key, &ambiguous.dropped_filters);
                self.note_intent(key, UtteranceIntent::Anaphora, report);
                return self.ask_to_disambiguate(&turn, ambiguous);
            }
            BuildOutcome::Ready(query) => query,
        };
        self.log_dropped(key, &query.dropped_filters);
        self.note_intent(key, query.intent, report);

        match query.intent {
            UtteranceIntent::Reset => self.reset(&turn),
            UtteranceIntent::Interjection => self.acknowledge(&turn),
            UtteranceIntent::Anaphora => match cached_target(&state, &query) {
                Some((reference, place)) => self.present_details(&turn, reference, place),
                None => self.search(&turn, query, report).await,
            },
            UtteranceIntent::NewTopic | UtteranceIntent::FilterRefinement => {
                self.search(&turn, query, report).await
            }
        }
    }

    async fn search(
        &self,
        turn: &Turn<'_>,
        query: StructuredQuery,
        report: &mut TurnReport,
    ) -> ConciergeResult<TurnOutcome> {
        let mut phases = PhaseTracker::new(turn.state.phase);
        phases.begin_search()?;
        let top_k = self.adapter.default_top_k();

        turn.checkpoint()?;
        let mut candidates = match self.retrieve(turn.key, &query, &query.hard_filters(), top_k).await {
            Ok(found) => found,
            Err(e) => return self.degrade(turn, e, report),
        };
        turn.checkpoint()?;

        let mut broadened = None;
        if candidates.is_empty() {
            let ladder = broaden(&query.hard_filters());
            for (step, relaxed) in ladder.into_iter().take(self.config.retrieval.max_broadening_steps) {
                turn.checkpoint()?;
                match self.retrieve(turn.key, &query, &relaxed, top_k).await {
                    Ok(found) if !found.is_empty() => {
                        events::filters_broadened(turn.key, step.as_str(), found.len());
                        candidates = found;
                        broadened = Some(step);
                        break;
                    }
                    Ok(_) => debug!(session = turn.key, step = step.as_str(), "broadened search still empty"),
                    Err(e) => return self.degrade(turn, e, report),
                }
            }
            turn.checkpoint()?;
        }
        self.observe(|o| o.mark_recovered(VECTOR_STORE_COMPONENT));

        if candidates.is_empty() {
            return self.no_results(turn, &query, &mut phases);
        }

        turn.checkpoint()?;
        let results = self.rank(turn.state, &query, &candidates);
        turn.checkpoint()?;

        phases.transition(DialoguePhase::Presenting)?;
        let delta = TurnDelta::against(turn.state)
            .with_turn(turn.record(query.intent, results.len()))
            .with_filters(query.filters.clone())
            .with_topic(topic_for(turn, &query))
            .with_results(results.clone())
            .with_pending_disambiguation(false)
            .with_phase(phases.current());
        turn.checkpoint()?;
        self.commit(turn, delta)?;

        let shortlist = self.presenter.shortlist_size();
        self.sessions.record_analytics(turn.key, |a| {
            a.record_surfaced(results.iter().take(shortlist).map(RankedResult::id));
            if broadened.is_some() {
                a.record_broadened();
            }
        });
        report.broadened = broadened.is_some();

        let chunks = self
            .presenter
            .results(&results, broadened.is_some(), turn.context_reset);
        Ok(TurnOutcome::Results {
            results,
            broadened,
            chunks,
            context_reset: turn.context_reset,
        })
    }

    async fn retrieve(
        &self,
        key: &str,
        query: &StructuredQuery,
        filters: &FilterSet,
        top_k: usize,
    ) -> ConciergeResult<Vec<PlaceCandidate>> {
        let started = Instant::now();
        let result = self
            .adapter
            .search_with_filters(query, filters, top_k)
            .instrument(retrieval_span!(self.adapter.backend_name(), top_k))
            .await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.sessions
            .record_analytics(key, |a| a.record_latency(latency_ms));
        result
    }

    fn rank(
        &self,
        state: &ConversationState,
        query: &StructuredQuery,
        candidates: &[PlaceCandidate],
    ) -> Vec<RankedResult> {
        let ctx = RankingContext::from_turn(state, query);
        ranking_span!(candidates.len()).in_scope(|| {
            self.ranker
                .rank_sorted(candidates, &ctx, &query.soft_weights, query.sort)
        })
    }

    /// Backend unavailable: serve the cached list (or the empty message),
    /// record the degradation, commit nothing.
    fn degrade(
        &self,
        turn: &Turn<'_>,
        err: ConciergeError,
        report: &mut TurnReport,
    ) -> ConciergeResult<TurnOutcome> {
        let unavailable =
            matches!(&err, ConciergeError::RetrievalError(e) if e.is_backend_unavailable());
        if !unavailable {
            return Err(err);
        }
        turn.checkpoint()?;

        let cached = turn.state.last_results.clone();
        let fallback = if cached.is_empty() {
            "empty_message"
        } else {
            "cached_results"
        };
        let event = DegradationEvent::new(VECTOR_STORE_COMPONENT, turn.key, err.to_string(), fallback);
        self.observe(|o| o.record_degradation(event.clone()));
        self.sessions.record_analytics(turn.key, |a| a.record_degraded());
        report.degraded = true;

        let chunks = self.presenter.degraded(&cached, turn.context_reset);
        Ok(TurnOutcome::Degraded {
            cached,
            event,
            chunks,
            context_reset: turn.context_reset,
        })
    }

    /// Every broadening step was empty. The request is remembered so a
    /// refinement can build on it; the previous list stays referenceable.
    fn no_results(
        &self,
        turn: &Turn<'_>,
        query: &StructuredQuery,
        phases: &mut PhaseTracker,
    ) -> ConciergeResult<TurnOutcome> {
        phases.transition(DialoguePhase::Presenting)?;
        phases.transition(DialoguePhase::Idle)?;
        let delta = TurnDelta::against(turn.state)
            .with_turn(turn.record(query.intent, 0))
            .with_filters(query.filters.clone())
            .with_topic(topic_for(turn, query))
            .with_pending_disambiguation(false)
            .with_phase(phases.current());
        turn.checkpoint()?;
        self.commit(turn, delta)?;
        Ok(TurnOutcome::NoResults {
            chunks: self.presenter.no_results(turn.context_reset),
            context_reset: turn.context_reset,
        })
    }

    /// Drill-down served from the committed list, without retrieval.
    fn present_details(
        &self,
        turn: &Turn<'_>,
        reference: PlaceRef,
        place: RankedResult,
    ) -> ConciergeResult<TurnOutcome> {
        // A lookup in the cached list still counts as a search step, so a
        // pending disambiguation leaves through `Searching`.
        let mut phases = PhaseTracker::new(turn.state.phase);
        phases.begin_search()?;
        phases.transition(DialoguePhase::Presenting)?;
        let delta = TurnDelta::against(turn.state)
            .with_turn(turn.record(UtteranceIntent::Anaphora, 1))
            .with_focus(Some(reference))
            .with_pending_disambiguation(false)
            .with_phase(phases.current());
        turn.checkpoint()?;
        self.commit(turn, delta)?;
        self.sessions
            .record_analytics(turn.key, |a| a.record_surfaced([place.id()]));

        let chunks = self.presenter.details(&place, turn.context_reset);
        Ok(TurnOutcome::Details {
            place,
            chunks,
            context_reset: turn.context_reset,
        })
    }

    fn ask_to_disambiguate(
        &self,
        turn: &Turn<'_>,
        ambiguous: AmbiguousReference,
    ) -> ConciergeResult<TurnOutcome> {
        let delta = TurnDelta::against(turn.state)
            .with_turn(turn.record(UtteranceIntent::Anaphora, 0))
            .with_pending_disambiguation(true)
            .with_phase(DialoguePhase::AwaitingDisambiguation);
        turn.checkpoint()?;
        self.commit(turn, delta)?;

        let chunks = self
            .presenter
            .disambiguation(&ambiguous.mention, ambiguous.held);
        Ok(TurnOutcome::Disambiguation {
            mention: ambiguous.mention,
            held: ambiguous.held,
            chunks,
            context_reset: turn.context_reset,
        })
    }

    fn reset(&self, turn: &Turn<'_>) -> ConciergeResult<TurnOutcome> {
        let delta = TurnDelta::against(turn.state)
            .with_turn(turn.record(UtteranceIntent::Reset, 0))
            .with_filters(FilterSet::new())
            .clear_topic()
            .with_results(Vec::new())
            .with_focus(None)
            .with_pending_disambiguation(false)
            .with_phase(DialoguePhase::Idle);
        turn.checkpoint()?;
        self.commit(turn, delta)?;
        Ok(TurnOutcome::Reset {
            chunks: self.presenter.reset(),
        })
    }

    fn acknowledge(&self, turn: &Turn<'_>) -> ConciergeResult<TurnOutcome> {
        let delta = TurnDelta::against(turn.state).with_turn(turn.record(UtteranceIntent::Interjection, 0));
        turn.checkpoint()?;
        self.commit(turn, delta)?;
        Ok(TurnOutcome::Acknowledged {
            chunks: self.presenter.acknowledged(),
            context_reset: turn.context_reset,
        })
    }

    /// Commit against the turn's base version.
    ///
    /// A conflict caused only by bookkeeping updates (presentation cursor,
    /// reference location) is rebased once. A conflict with another turn's
    /// commit is returned.
    fn commit(&self, turn: &Turn<'_>, delta: TurnDelta) -> ConciergeResult<ConversationState> {
        match self.sessions.commit_turn(turn.key, delta.clone()) {
            Err(err @ ConciergeError::SessionError(SessionError::CommitConflict { .. })) => {
                let current = match self.sessions.open(turn.key)? {
                    StateLookup::Existing(state) => state,
                    StateLookup::Created(_) | StateLookup::Reset(_) => return Err(err),
                };
                if current.turn_count != turn.state.turn_count {
                    return Err(err);
                }
                debug!(session = turn.key, version = current.version, "rebasing turn over bookkeeping update");
                self.sessions.commit_turn(
                    turn.key,
                    TurnDelta {
                        base_version: current.version,
                        ..delta
                    },
                )
            }
            other => other,
        }
    }

    fn note_intent(&self, key: &str, intent: UtteranceIntent, report: &mut TurnReport) {
        report.intent = Some(intent);
        tracing::Span::current().record("intent", intent.as_str());
        self.sessions
            .record_analytics(key, |a| a.record_intent(intent.as_str()));
    }

    fn log_dropped(&self, key: &str, dropped: &[QueryError]) {
        for err in dropped {
            if let QueryError::InvalidFilterValue {
                kind,
                value,
                reason,
            } = err
            {
                events::filter_dropped(key, kind, value, reason);
            }
        }
    }

    fn log_turn(&self, key: &str, report: &TurnReport, latency: Duration, outcome: &TurnOutcome) {
        let entry = TurnLogEntry::new(key, report.intent, latency, outcome.places().len())
            .degraded(report.degraded)
            .broadened(report.broadened)
            .cancelled(outcome.is_cancelled());
        self.observe(|o| o.record_turn(entry));
    }

    fn observe<R>(&self, f: impl FnOnce(&mut ObservabilityEngine) -> R) -> R {
        let mut engine = self
            .observability
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }
}

/// The held place an anaphoric query points at.
fn cached_target(
    state: &ConversationState,
    query: &StructuredQuery,
) -> Option<(PlaceRef, RankedResult)> {
    let reference = query.pinned.as_ref()?;
    state
        .result_for(reference)
        .map(|place| (reference.clone(), place.clone()))
}

/// New topics remember what was said; refinements keep the existing topic.
fn topic_for(turn: &Turn<'_>, query: &StructuredQuery) -> String {
    match (&turn.state.topic, query.intent) {
        (Some(topic), intent) if intent != UtteranceIntent::NewTopic => topic.clone(),
        _ => turn.utterance.trim().to_string(),
    }
}

impl std::fmt::Debug for DialogueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueEngine")
            .field("backend", &self.adapter.backend_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
