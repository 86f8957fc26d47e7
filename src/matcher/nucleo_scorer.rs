//! Similarity backed by the `nucleo` fuzzy matcher.
//!
//! nucleo scores are unbounded and depend on match bonuses, so a raw score is normalized
//! against the best score the shorter string could achieve: a perfect match of itself.
//! The pair is tried in both directions and the better alignment wins.

use std::cell::RefCell;

use nucleo::{Config, Matcher, Utf32Str};

use super::similarity::{Similarity, preprocess};

pub struct NucleoSimilarity {
    matcher: RefCell<Matcher>,
}

impl NucleoSimilarity {
    pub fn new() -> Self {
        Self { matcher: RefCell::new(Matcher::new(Config::DEFAULT)) }
    }

    /// `needle` scored inside `haystack`, as a percentage of its self-match score
    fn normalized(matcher: &mut Matcher, haystack: &str, needle: &str) -> u32 {
        let mut haystack_buf = Vec::new();
        let mut needle_buf = Vec::new();
        let haystack = Utf32Str::new(haystack, &mut haystack_buf);
        let needle = Utf32Str::new(needle, &mut needle_buf);

        let Some(perfect) = matcher.fuzzy_match(needle, needle).filter(|s| *s > 0) else {
            return 0;
        };
        let found = matcher.fuzzy_match(haystack, needle).unwrap_or(0);
        (u32::from(found) * 100 / u32::from(perfect)).min(100)
    }
}

impl Default for NucleoSimilarity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NucleoSimilarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NucleoSimilarity").finish_non_exhaustive()
    }
}

impl Similarity for NucleoSimilarity {
    fn similarity(&self, query: &str, candidate: &str) -> u8 {
        let query = preprocess(query);
        let candidate = preprocess(candidate);
        if query.is_empty() || candidate.is_empty() {
            return 0;
        }

        let mut matcher = self.matcher.borrow_mut();
        let forward = Self::normalized(&mut matcher, &query, &candidate);
        let backward = Self::normalized(&mut matcher, &candidate, &query);
        forward.max(backward) as u8
    }
}
