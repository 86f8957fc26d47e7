use std::cmp::Ordering;

use super::similarity::Similarity;
use crate::models::{IndexEntry, MatchCandidate};

/// Default confidence threshold
pub const DEFAULT_MIN_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Candidates scoring below this are dropped
    pub threshold: u8,
    /// Keep at most this many candidates; `None` keeps all
    pub limit: Option<usize>,
}

impl MatchOptions {
    pub fn top(threshold: u8, limit: usize) -> Self {
        Self { threshold, limit: Some(limit) }
    }

    pub fn best(threshold: u8) -> Self {
        Self::top(threshold, 1)
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::best(DEFAULT_MIN_SCORE)
    }
}

/// Best-first ordering: higher score, then shorter name, then lexicographic name
fn rank(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.entry.name.chars().count().cmp(&b.entry.name.chars().count()))
        .then_with(|| a.entry.key().cmp(&b.entry.key()))
        .then_with(|| a.entry.name.cmp(&b.entry.name))
}

/// Score every entry against `query` and return those clearing the threshold, best first.
///
/// An empty result means no confident match; callers decide how to report it.
pub fn match_candidates<'a>(
    query: &str,
    entries: impl IntoIterator<Item = &'a IndexEntry>,
    options: MatchOptions,
    similarity: &dyn Similarity,
) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = entries
        .into_iter()
        .filter_map(|entry| {
            let score = similarity.similarity(query, &entry.name);
            (score >= options.threshold).then(|| MatchCandidate { entry: entry.clone(), score })
        })
        .collect();

    candidates.sort_by(rank);
    if let Some(limit) = options.limit {
        candidates.truncate(limit);
    }
    candidates
}

/// Highest-scoring entry regardless of threshold, for "best was X" diagnostics
pub fn best_candidate<'a>(
    query: &str,
    entries: impl IntoIterator<Item = &'a IndexEntry>,
    similarity: &dyn Similarity,
) -> Option<MatchCandidate> {
    match_candidates(query, entries, MatchOptions::best(0), similarity).into_iter().next()
}
