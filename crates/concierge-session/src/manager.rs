//! ContextManager: the single owner of conversation state.
//!
//! Reads never mutate. Every change goes through [`ContextManager::commit_turn`],
//! which applies a [`TurnDelta`] to a copy and stores it with compare-and-set
//! on the version the turn started from.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use concierge_core::config::SessionConfig;
use concierge_core::errors::{ConciergeError, ConciergeResult, SessionError};
use concierge_core::models::{ConversationState, Coordinates, TurnDelta};
use concierge_core::traits::ISessionStore;

use crate::analytics::SessionAnalytics;
use crate::lifecycle::{StateLookup, TurnPermit};
use crate::store::InMemorySessionStore;

/// Attempts for small bookkeeping updates that race with a turn commit.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

pub struct ContextManager {
    store: Arc<dyn ISessionStore>,
    config: SessionConfig,
    permits: DashMap<String, Arc<Mutex<()>>>,
    analytics: DashMap<String, SessionAnalytics>,
}

impl ContextManager {
    pub fn new(store: Arc<dyn ISessionStore>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            permits: DashMap::new(),
            analytics: DashMap::new(),
        }
    }

    /// A manager over a fresh [`InMemorySessionStore`].
    pub fn in_memory(config: SessionConfig) -> Self {
        Self::new(Arc::new(InMemorySessionStore::new()), config)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current state, creating a fresh one if absent or expired.
    pub fn get_state(&self, key: &str) -> ConciergeResult<ConversationState> {
        self.open(key).map(StateLookup::into_state)
    }

    /// Like [`get_state`](Self::get_state), reporting whether the state
    /// already existed, was created, or replaced an expired one.
    pub fn open(&self, key: &str) -> ConciergeResult<StateLookup> {
        self.open_at(key, Utc::now())
    }

    /// [`open`](Self::open) evaluated at `now`.
    pub fn open_at(&self, key: &str, now: DateTime<Utc>) -> ConciergeResult<StateLookup> {
        let mut expired = false;
        let mut fresh = ConversationState::new(key);
        if let Some(state) = self.store.get(key)? {
            if !state.is_expired(self.config.timeout(), now) {
                return Ok(StateLookup::Existing(state));
            }
            expired = true;
            // The replacement continues the version sequence, so a delete
            // conditioned on the expired state's version cannot match it.
            fresh.version = state.version + 1;
            if self.store.compare_and_delete(key, state.version)? {
                self.analytics.remove(key);
                info!(session = key, idle_secs = state.idle_for(now).as_secs(), "session expired on access");
            }
        }

        if self.store.compare_and_set(key, None, fresh.clone())? {
            debug!(session = key, expired, "created conversation state");
            return Ok(if expired {
                StateLookup::Reset(fresh)
            } else {
                StateLookup::Created(fresh)
            });
        }

        // Another caller created the session between our read and write.
        match self.store.get(key)? {
            Some(state) if expired => Ok(StateLookup::Reset(state)),
            Some(state) => Ok(StateLookup::Existing(state)),
            None => Err(SessionError::StoreFailure {
                reason: format!("session {key} vanished during creation"),
            }
            .into()),
        }
    }

    /// Apply `delta` atomically against the version it was built from.
    ///
    /// Fails with `CommitConflict` if another commit landed first and with
    /// `Expired` if the session was deleted meanwhile. Nothing is written on
    /// failure.
    pub fn commit_turn(&self, key: &str, delta: TurnDelta) -> ConciergeResult<ConversationState> {
        let current = self.store.get(key)?.ok_or_else(|| SessionError::Expired {
            session_key: key.to_string(),
        })?;

        if current.version != delta.base_version {
            return Err(SessionError::CommitConflict {
                session_key: key.to_string(),
                expected: delta.base_version,
                actual: Some(current.version),
            }
            .into());
        }
        if let Some(phase) = delta.phase {
            if !phase.is_committable() {
                return Err(SessionError::InvalidTransition {
                    from: current.phase,
                    to: phase,
                }
                .into());
            }
        }

        let base_version = delta.base_version;
        let next = current.applied(delta, self.config.history_depth, Utc::now());
        if self.store.compare_and_set(key, Some(base_version), next.clone())? {
            debug!(
                session = key,
                version = next.version,
                turns = next.turn_count,
                phase = next.phase.as_str(),
                "committed turn"
            );
            return Ok(next);
        }

        let err = match self.store.get(key)? {
            None => SessionError::Expired {
                session_key: key.to_string(),
            },
            Some(state) => SessionError::CommitConflict {
                session_key: key.to_string(),
                expected: base_version,
                actual: Some(state.version),
            },
        };
        warn!(session = key, error = %err, "commit rejected");
        Err(err.into())
    }

    /// Wait for exclusive use of the session for one turn.
    pub async fn begin_turn(&self, key: &str) -> TurnPermit {
        let lock = self.permit_lock(key);
        TurnPermit::new(key, lock.lock_owned().await)
    }

    /// Take the permit only if no turn is running.
    pub fn try_begin_turn(&self, key: &str) -> Option<TurnPermit> {
        let lock = self.permit_lock(key);
        lock.try_lock_owned()
            .ok()
            .map(|guard| TurnPermit::new(key, guard))
    }

    /// Whether a turn currently holds the session's permit.
    pub fn has_turn_in_flight(&self, key: &str) -> bool {
        self.permits
            .get(key)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    fn permit_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.permits
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// The speech layer finished presenting results up to `upto`.
    pub fn mark_presented(&self, key: &str, upto: usize) -> ConciergeResult<ConversationState> {
        self.update(key, |state| TurnDelta::against(state).with_cursor(upto))
    }

    /// Location used by the proximity ranking factor.
    pub fn set_reference_location(
        &self,
        key: &str,
        location: Coordinates,
    ) -> ConciergeResult<ConversationState> {
        self.open(key)?;
        self.update(key, |state| {
            TurnDelta::against(state).with_reference_location(Some(location))
        })
    }

    /// Commit a bookkeeping delta, rebuilding it if a turn commit raced it.
    fn update(
        &self,
        key: &str,
        build: impl Fn(&ConversationState) -> TurnDelta,
    ) -> ConciergeResult<ConversationState> {
        let mut attempt = 1;
        loop {
            let state = self.store.get(key)?.ok_or_else(|| SessionError::Expired {
                session_key: key.to_string(),
            })?;
            match self.commit_turn(key, build(&state)) {
                Err(ConciergeError::SessionError(SessionError::CommitConflict { .. }))
                    if attempt < MAX_UPDATE_ATTEMPTS =>
                {
                    attempt += 1;
                    debug!(session = key, attempt, "retrying state update after conflict");
                }
                result => return result,
            }
        }
    }

    /// Explicit end of a conversation. Returns whether state existed.
    pub fn end_session(&self, key: &str) -> ConciergeResult<bool> {
        let existed = self.store.delete(key)?;
        let analytics = self.release(key).unwrap_or_default();
        info!(
            session = key,
            existed,
            turns = analytics.turns,
            degraded = analytics.degraded_turns,
            avg_latency_ms = analytics.avg_latency_ms(),
            "session ended"
        );
        Ok(existed)
    }

    /// Delete every session idle past the timeout. Returns the expired keys.
    pub fn expire_idle(&self) -> ConciergeResult<Vec<String>> {
        self.expire_idle_at(Utc::now())
    }

    /// [`expire_idle`](Self::expire_idle) evaluated at `now`.
    ///
    /// Sessions with a turn in flight are skipped. Deletion is conditional
    /// on the observed version, so a commit landing first keeps the session.
    pub fn expire_idle_at(&self, now: DateTime<Utc>) -> ConciergeResult<Vec<String>> {
        let timeout = self.config.timeout();
        let mut expired = Vec::new();
        for key in self.store.keys()? {
            if self.has_turn_in_flight(&key) {
                debug!(session = %key, "skipping expiry: turn in flight");
                continue;
            }
            let Some(state) = self.store.get(&key)? else {
                continue;
            };
            if !state.is_expired(timeout, now) {
                continue;
            }
            if self.store.compare_and_delete(&key, state.version)? {
                info!(
                    session = %key,
                    idle_secs = state.idle_for(now).as_secs(),
                    turns = state.turn_count,
                    "session expired"
                );
                self.release(&key);
                expired.push(key);
            }
        }
        Ok(expired)
    }

    /// Drop the permit and analytics of a session no longer stored.
    fn release(&self, key: &str) -> Option<SessionAnalytics> {
        // Only the map's own handle may remain: a caller that cloned the
        // lock but has not locked it yet keeps the entry alive.
        self.permits
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        self.analytics.remove(key).map(|(_, a)| a)
    }

    /// Mutate the analytics of one session.
    pub fn record_analytics(&self, key: &str, record: impl FnOnce(&mut SessionAnalytics)) {
        let mut entry = self.analytics.entry(key.to_string()).or_default();
        record(&mut entry);
    }

    /// Snapshot of a session's analytics.
    pub fn analytics(&self, key: &str) -> Option<SessionAnalytics> {
        self.analytics.get(key).map(|a| a.clone())
    }

    /// Number of stored sessions.
    pub fn session_count(&self) -> ConciergeResult<usize> {
        Ok(self.store.keys()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn release_keeps_a_permit_another_caller_is_about_to_lock() {
        let m = ContextManager::in_memory(SessionConfig::default());
        m.get_state("s1").unwrap();

        // A turn has fetched the lock but not locked it yet.
        let pending = m.permit_lock("s1");
        m.end_session("s1").unwrap();

        let _first = pending.clone().lock_owned().await;
        assert!(Arc::ptr_eq(&pending, &m.permit_lock("s1")));
        assert!(m.try_begin_turn("s1").is_none());
        assert!(m.has_turn_in_flight("s1"));
    }

    #[test]
    fn release_drops_an_unused_permit() {
        let m = ContextManager::in_memory(SessionConfig::default());
        drop(m.permit_lock("s1"));
        m.end_session("s1").unwrap();
        assert!(m.permits.get("s1").is_none());
    }
}
