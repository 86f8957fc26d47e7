//! String similarity strategies.
//!
//! The default [`WeightedRatio`] blends several normalized edit-based scores so that word
//! order, partial overlap and small typos all still score high:
//!
//! - `ratio`: normalized indel similarity, `100 · 2·LCS / (|a| + |b|)`
//! - `partial`: best `ratio` of the shorter string against same-length windows of the longer
//! - `token_sort` / `token_set`: `ratio` over sorted words and over shared/unshared word sets
//!
//! Which scores participate depends on how different the two lengths are. A short command
//! name inside a long query is judged by its best partial alignment, scaled down so a full
//! match of similar length still wins.

use std::collections::BTreeSet;

/// Pluggable similarity metric returning a score in `0..=100`
pub trait Similarity {
    fn similarity(&self, query: &str, candidate: &str) -> u8;
}

/// Token-aware weighted fuzzy ratio
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

const UNBASE_SCALE: f64 = 0.95;
const SIMILAR_LENGTH_RATIO: f64 = 1.5;
const LONG_LENGTH_RATIO: f64 = 8.0;

impl Similarity for WeightedRatio {
    fn similarity(&self, query: &str, candidate: &str) -> u8 {
        let a = preprocess(query);
        let b = preprocess(candidate);
        if a.is_empty() || b.is_empty() {
            return 0;
        }

        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        let base = ratio(&a_chars, &b_chars);

        let (shorter, longer) = (a_chars.len().min(b_chars.len()), a_chars.len().max(b_chars.len()));
        let length_ratio = longer as f64 / shorter as f64;

        let score = if length_ratio < SIMILAR_LENGTH_RATIO {
            let sorted = ratio_str(&token_sort(&a), &token_sort(&b)) * UNBASE_SCALE;
            let set = token_set_ratio(&a, &b) * UNBASE_SCALE;
            base.max(sorted).max(set)
        } else {
            let partial_scale = if length_ratio < LONG_LENGTH_RATIO { 0.9 } else { 0.6 };
            let partial = partial_ratio(&a_chars, &b_chars) * partial_scale;
            let partial_tokens = partial_token_ratio(&a, &b) * UNBASE_SCALE * partial_scale;
            base.max(partial).max(partial_tokens)
        };

        score.round().clamp(0.0, 100.0) as u8
    }
}

/// Lowercase, turn every non-alphanumeric into a space, collapse whitespace
pub(crate) fn preprocess(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            let keep = c.is_alphanumeric();
            c.to_lowercase().map(move |l| if keep { l } else { ' ' })
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(curr[j]) };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_len(a, b)) as f64 / total as f64
}

fn ratio_str(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio(&a, &b)
}

/// Best alignment of the shorter string against windows of the longer, including the
/// partial windows hanging off either end
fn partial_ratio(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    let (m, n) = (short.len(), long.len());

    let mut best = 0.0f64;
    for start in 0..=(n - m) {
        best = best.max(ratio(short, &long[start..start + m]));
        if best >= 100.0 {
            return 100.0;
        }
    }
    for end in 1..m {
        best = best.max(ratio(short, &long[..end]));
    }
    for start in (n - m + 1)..n {
        best = best.max(ratio(short, &long[start..]));
    }
    best
}

fn tokens(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

fn token_sort(s: &str) -> String {
    let mut words: Vec<&str> = s.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}

fn join_tokens<'a, 'b: 'a>(words: impl Iterator<Item = &'a &'b str>) -> String {
    words.copied().collect::<Vec<_>>().join(" ")
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let (ta, tb) = (tokens(a), tokens(b));
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let common = join_tokens(ta.intersection(&tb));
    let only_a = join_tokens(ta.difference(&tb));
    let only_b = join_tokens(tb.difference(&ta));
    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let combine = |rest: &str| {
        if common.is_empty() {
            rest.to_string()
        } else if rest.is_empty() {
            common.clone()
        } else {
            format!("{} {}", common, rest)
        }
    };
    let with_a = combine(&only_a);
    let with_b = combine(&only_b);

    let mut best = ratio_str(&with_a, &with_b);
    if !common.is_empty() {
        best = best.max(ratio_str(&common, &with_a)).max(ratio_str(&common, &with_b));
    }
    best
}

/// A shared word is a full partial match; otherwise align the sorted word lists
fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let (ta, tb) = (tokens(a), tokens(b));
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    if ta.intersection(&tb).next().is_some() {
        return 100.0;
    }
    let sorted_a: Vec<char> = token_sort(a).chars().collect();
    let sorted_b: Vec<char> = token_sort(b).chars().collect();
    partial_ratio(&sorted_a, &sorted_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_preprocess() {
        assert_eq!(preprocess("  Calculate   the RMSD! "), "calculate the rmsd");
        assert_eq!(preprocess("rms/fit"), "rms fit");
        assert_eq!(preprocess("---"), "");
    }

    #[test]
    fn test_ratio_basics() {
        assert_eq!(ratio(&chars("rms"), &chars("rms")), 100.0);
        assert_eq!(ratio(&chars("abc"), &chars("xyz")), 0.0);
        // LCS("rmsd", "rms") = 3 -> 2*3/7
        let r = ratio(&chars("rmsd"), &chars("rms"));
        assert!((r - 600.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_finds_substring() {
        let query = chars("calculate distance between atoms");
        assert_eq!(partial_ratio(&chars("distance"), &query), 100.0);
        assert_eq!(partial_ratio(&query, &chars("distance")), 100.0);
    }

    #[test]
    fn test_token_set_ignores_order_and_duplicates() {
        assert_eq!(token_set_ratio("hydrogen bond analysis", "analysis bond hydrogen"), 100.0);
        assert_eq!(token_set_ratio("rms fit", "rms"), 100.0);
    }

    #[test]
    fn test_weighted_ratio_exact_and_case() {
        assert_eq!(WeightedRatio.similarity("distance", "distance"), 100);
        assert_eq!(WeightedRatio.similarity("DISTANCE", "distance"), 100);
    }

    #[test]
    fn test_weighted_ratio_word_in_long_query() {
        let score = WeightedRatio.similarity("calculate distance between atoms", "distance");
        assert!(score >= 70, "score was {}", score);
    }

    #[test]
    fn test_weighted_ratio_typo() {
        let score = WeightedRatio.similarity("distnace", "distance");
        assert!(score >= 70, "score was {}", score);
    }

    #[test]
    fn test_weighted_ratio_unrelated() {
        for name in ["distance", "rms", "hbond", "cluster", "radgyr", "angle"] {
            let score = WeightedRatio.similarity("xyzzyfoobar unrelated nonsense", name);
            assert!(score < 70, "{} scored {}", name, score);
        }
    }

    #[test]
    fn test_weighted_ratio_empty_inputs() {
        assert_eq!(WeightedRatio.similarity("", "distance"), 0);
        assert_eq!(WeightedRatio.similarity("distance", "  "), 0);
        assert_eq!(WeightedRatio.similarity("!!!", "rms"), 0);
    }

    #[test]
    fn test_weighted_ratio_is_bounded() {
        for (a, b) in [("a", "aaaaaaaaaaaaaaaaaaaaaaaa"), ("rms rms rms", "rms"), ("é", "e")] {
            assert!(WeightedRatio.similarity(a, b) <= 100);
        }
    }
}
