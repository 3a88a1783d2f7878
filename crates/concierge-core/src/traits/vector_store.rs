use crate::errors::ConciergeResult;
use crate::models::{FilterSet, PlaceCandidate, PlaceId, PlaceMetadata};

/// Nearest-neighbour search backend over the place index.
///
/// Calls are blocking; the retrieval adapter runs them on the blocking pool
/// under a timeout.
pub trait IVectorStore: Send + Sync {
    /// Up to `top_k` candidates for `text`, best first.
    ///
    /// Backends that report `supports_filtering() == false` may ignore `filters`.
    fn search(
        &self,
        text: &str,
        filters: &FilterSet,
        top_k: usize,
    ) -> ConciergeResult<Vec<PlaceCandidate>>;

    /// Insert or replace one place.
    fn upsert(&self, id: &PlaceId, embedding: &[f32], metadata: &PlaceMetadata) -> ConciergeResult<()>;

    /// Whether `search` applies filters server-side.
    fn supports_filtering(&self) -> bool;

    fn name(&self) -> &str;
}
