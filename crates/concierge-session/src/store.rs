//! InMemorySessionStore: DashMap-backed [`ISessionStore`].

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use concierge_core::errors::ConciergeResult;
use concierge_core::models::ConversationState;
use concierge_core::traits::ISessionStore;

/// Thread-safe session store. Conditional writes hold the shard lock for
/// the key, so compare-and-set is atomic per session.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    states: DashMap<String, ConversationState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl ISessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> ConciergeResult<Option<ConversationState>> {
        Ok(self.states.get(key).map(|s| s.clone()))
    }

    fn set(&self, key: &str, state: ConversationState) -> ConciergeResult<()> {
        self.states.insert(key.to_string(), state);
        Ok(())
    }

    fn delete(&self, key: &str) -> ConciergeResult<bool> {
        Ok(self.states.remove(key).is_some())
    }

    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<u64>,
        state: ConversationState,
    ) -> ConciergeResult<bool> {
        let written = match self.states.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if expected == Some(entry.get().version) {
                    entry.insert(state);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                if expected.is_none() {
                    entry.insert(state);
                    true
                } else {
                    false
                }
            }
        };
        Ok(written)
    }

    fn compare_and_delete(&self, key: &str, expected: u64) -> ConciergeResult<bool> {
        Ok(self
            .states
            .remove_if(key, |_, state| state.version == expected)
            .is_some())
    }

    fn keys(&self) -> ConciergeResult<Vec<String>> {
        Ok(self.states.iter().map(|r| r.key().clone()).collect())
    }
}
