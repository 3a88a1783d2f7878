use serde::{Deserialize, Serialize};

use super::defaults;

/// Response assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Results read out per turn.
    pub shortlist_size: usize,
    /// Soft upper bound on characters per speech chunk.
    pub chunk_chars: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            shortlist_size: defaults::DEFAULT_SHORTLIST_SIZE,
            chunk_chars: defaults::DEFAULT_CHUNK_CHARS,
        }
    }
}
