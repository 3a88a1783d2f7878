use crate::errors::ConciergeResult;
use crate::models::ConversationState;

/// Session-keyed persistence for conversation state.
///
/// `compare_and_set` and `compare_and_delete` must be atomic per key.
pub trait ISessionStore: Send + Sync {
    fn get(&self, key: &str) -> ConciergeResult<Option<ConversationState>>;

    /// Unconditional write.
    fn set(&self, key: &str, state: ConversationState) -> ConciergeResult<()>;

    /// Returns whether a state was removed.
    fn delete(&self, key: &str) -> ConciergeResult<bool>;

    /// Store `state` only if the stored version equals `expected`
    /// (`None` = key must be absent). Returns whether the write happened.
    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<u64>,
        state: ConversationState,
    ) -> ConciergeResult<bool>;

    /// Delete only if the stored version equals `expected`.
    fn compare_and_delete(&self, key: &str, expected: u64) -> ConciergeResult<bool>;

    fn keys(&self) -> ConciergeResult<Vec<String>>;
}
