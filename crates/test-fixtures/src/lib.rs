//! Test fixture loader and an in-memory vector backend for Concierge tests.
//!
//! Provides typed deserialization of the fixture JSON files, a builder for
//! hand-made candidates, and [`FixtureVectorStore`], a deterministic
//! hashed bag-of-words backend with injectable latency and failures.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use chrono::Utc;
use concierge_core::errors::{ConciergeResult, RetrievalError};
use concierge_core::intent::UtteranceIntent;
use concierge_core::models::{
    ConversationState, Coordinates, FilterSet, OpeningHours, PlaceCandidate, PlaceId,
    PlaceMetadata, RankedResult, TurnDelta, TurnRecord,
};
use concierge_core::traits::IVectorStore;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: PlaceId,
    pub metadata: PlaceMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub count: usize,
    pub places: Vec<CatalogEntry>,
}

/// The shared place catalog (`places/catalog.json`).
pub fn load_catalog() -> Catalog {
    load_fixture("places/catalog.json")
}

/// Catalog entry by id.
///
/// # Panics
/// Panics if the id is not in the catalog.
pub fn catalog_place(id: &str) -> PlaceCandidate {
    load_catalog()
        .places
        .into_iter()
        .find(|p| p.id == id)
        .map(|p| PlaceCandidate::new(p.id, 0.0, p.metadata))
        .unwrap_or_else(|| panic!("No place {} in catalog", id))
}

/// One row of `golden/classification.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationCase {
    pub utterance: String,
    pub topic: Option<String>,
    pub held: bool,
    pub expected: UtteranceIntent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationGolden {
    pub held_names: Vec<String>,
    pub cases: Vec<ClassificationCase>,
}

pub fn load_classification_golden() -> ClassificationGolden {
    load_fixture("golden/classification.json")
}

// ---------------------------------------------------------------------------
// Candidate builders
// ---------------------------------------------------------------------------

/// Start building a candidate with the given id.
pub fn place(id: &str) -> PlaceBuilder {
    PlaceBuilder {
        candidate: PlaceCandidate::new(
            id,
            0.5,
            PlaceMetadata {
                name: id.to_string(),
                category: "restaurant".to_string(),
                ..PlaceMetadata::default()
            },
        ),
    }
}

#[derive(Debug, Clone)]
pub struct PlaceBuilder {
    candidate: PlaceCandidate,
}

impl PlaceBuilder {
    pub fn similarity(mut self, similarity: f64) -> Self {
        self.candidate.similarity = similarity;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.candidate.metadata.name = name.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.candidate.metadata.category = category.to_string();
        self
    }

    pub fn cuisine(mut self, cuisine: &str) -> Self {
        self.candidate.metadata.cuisine = Some(cuisine.to_string());
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.candidate.metadata.rating = Some(rating);
        self
    }

    pub fn reviews(mut self, count: u32) -> Self {
        self.candidate.metadata.review_count = Some(count);
        self
    }

    pub fn price(mut self, tier: u8) -> Self {
        self.candidate.metadata.price_tier = Some(tier);
        self
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.candidate.metadata.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }

    pub fn hours(mut self, open_minute: u16, close_minute: u16) -> Self {
        self.candidate.metadata.hours = Some(OpeningHours::new(open_minute, close_minute));
        self
    }

    pub fn atmosphere(mut self, tags: &[&str]) -> Self {
        self.candidate.metadata.atmosphere = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.candidate.metadata.city = Some(city.to_string());
        self
    }

    pub fn build(self) -> PlaceCandidate {
        self.candidate
    }
}

/// Wrap candidates as ranked results in the given order.
pub fn ranked(candidates: Vec<PlaceCandidate>) -> Vec<RankedResult> {
    let n = candidates.len() as f64;
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| RankedResult {
            candidate,
            composite: (n - i as f64) / n.max(1.0),
            breakdown: Default::default(),
        })
        .collect()
}

/// A conversation that has committed one search turn presenting `candidates`.
pub fn state_holding(
    session_key: &str,
    topic: &str,
    filters: FilterSet,
    candidates: Vec<PlaceCandidate>,
) -> ConversationState {
    let state = ConversationState::new(session_key);
    let count = candidates.len();
    let delta = TurnDelta::against(&state)
        .with_turn(TurnRecord::new(topic, UtteranceIntent::NewTopic, count))
        .with_topic(topic)
        .with_filters(filters)
        .with_results(ranked(candidates));
    state.applied(delta, 5, Utc::now())
}

/// Names as held places, in order, with default metadata.
pub fn named_places(names: &[String]) -> Vec<PlaceCandidate> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| place(&format!("held-{}", i + 1)).name(name).build())
        .collect()
}

// ---------------------------------------------------------------------------
// FixtureVectorStore
// ---------------------------------------------------------------------------

const DIMENSIONS: usize = 256;

struct IndexedPlace {
    id: PlaceId,
    vector: Vec<f32>,
    metadata: PlaceMetadata,
}

/// Deterministic in-memory vector backend.
///
/// Vectors are hashed bag-of-words over the place's descriptive text, so a
/// query mentioning "pasta" lands near places described with "pasta".
pub struct FixtureVectorStore {
    places: RwLock<Vec<IndexedPlace>>,
    latency: Duration,
    failures_remaining: AtomicU32,
    calls: AtomicUsize,
    /// Local minute used when filtering server-side; `None` disables it.
    filter_minute: Option<u16>,
    score_overrides: HashMap<PlaceId, f64>,
}

impl FixtureVectorStore {
    pub fn empty() -> Self {
        Self {
            places: RwLock::new(Vec::new()),
            latency: Duration::ZERO,
            failures_remaining: AtomicU32::new(0),
            calls: AtomicUsize::new(0),
            filter_minute: None,
            score_overrides: HashMap::new(),
        }
    }

    /// A store preloaded with the shared catalog.
    pub fn from_catalog() -> Self {
        Self::with_places(
            load_catalog()
                .places
                .into_iter()
                .map(|p| PlaceCandidate::new(p.id, 0.0, p.metadata))
                .collect(),
        )
    }

    pub fn with_places(places: Vec<PlaceCandidate>) -> Self {
        let store = Self::empty();
        {
            let mut index = store.places.write().unwrap_or_else(|e| e.into_inner());
            for p in places {
                index.push(IndexedPlace {
                    vector: embed(&describe(&p.metadata)),
                    id: p.id,
                    metadata: p.metadata,
                });
            }
        }
        store
    }

    /// Block every search call for `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Apply hard filters in the backend at the given local minute.
    pub fn with_server_side_filtering(mut self, minute_of_day: u16) -> Self {
        self.filter_minute = Some(minute_of_day);
        self
    }

    /// Report `score` as the similarity of `id` regardless of the query.
    pub fn with_score(mut self, id: &str, score: f64) -> Self {
        self.score_overrides.insert(id.to_string(), score);
        self
    }

    /// Fail the next `n` search calls.
    pub fn fail_next(&self, n: u32) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    /// Number of search calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.places.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn failure(&self, reason: &str) -> RetrievalError {
        RetrievalError::BackendFailure {
            backend: self.name().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl IVectorStore for FixtureVectorStore {
    fn search(
        &self,
        text: &str,
        filters: &FilterSet,
        top_k: usize,
    ) -> ConciergeResult<Vec<PlaceCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(self.failure("injected failure").into());
        }

        let query = embed(text);
        let index = self
            .places
            .read()
            .map_err(|_| self.failure("index lock poisoned"))?;
        let mut hits: Vec<PlaceCandidate> = index
            .iter()
            .map(|p| {
                let score = self
                    .score_overrides
                    .get(&p.id)
                    .copied()
                    .unwrap_or_else(|| f64::from(dot(&query, &p.vector)));
                PlaceCandidate::new(p.id.clone(), score, p.metadata.clone())
            })
            .filter(|c| match self.filter_minute {
                Some(minute) => filters.matches_at(c, minute),
                None => true,
            })
            .collect();
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(top_k);
        Ok(hits)
    }

    fn upsert(&self, id: &PlaceId, embedding: &[f32], metadata: &PlaceMetadata) -> ConciergeResult<()> {
        let vector = if embedding.len() == DIMENSIONS {
            embedding.to_vec()
        } else {
            embed(&describe(metadata))
        };
        let mut index = self
            .places
            .write()
            .map_err(|_| self.failure("index lock poisoned"))?;
        index.retain(|p| &p.id != id);
        index.push(IndexedPlace {
            id: id.clone(),
            vector,
            metadata: metadata.clone(),
        });
        Ok(())
    }

    fn supports_filtering(&self) -> bool {
        self.filter_minute.is_some()
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

fn describe(meta: &PlaceMetadata) -> String {
    let mut parts = vec![meta.name.clone(), meta.category.clone()];
    parts.extend(meta.cuisine.clone());
    parts.extend(meta.description.clone());
    parts.extend(meta.city.clone());
    parts.extend(meta.atmosphere.iter().cloned());
    parts.join(" ")
}

/// FNV-1a bucket hashing of lowercase terms, L2 normalised.
fn embed(text: &str) -> Vec<f32> {
    let mut vec = vec![0.0f32; DIMENSIONS];
    for term in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.len() >= 3)
        .map(str::to_lowercase)
    {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        vec[(h as usize) % DIMENSIONS] += 1.0;
    }
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in &mut vec {
            *v /= norm;
        }
    }
    vec
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
