use serde::{Deserialize, Serialize};

use super::index::IndexEntry;

/// A ranked candidate produced per query. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub entry: IndexEntry,
    /// Similarity in `0..=100`
    pub score: u8,
}
