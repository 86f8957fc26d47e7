//! Fuzzy matching of free-text queries against indexed command names.
//!
//! The metric is a strategy behind [`Similarity`]; [`Scorer`] selects one at runtime.
//! Matching always scans the full name set: a manual documents at most a few thousand
//! commands.

pub mod nucleo_scorer;
pub mod ranking;
pub mod similarity;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use nucleo_scorer::NucleoSimilarity;
pub use ranking::{DEFAULT_MIN_SCORE, MatchOptions, best_candidate, match_candidates};
pub use similarity::{Similarity, WeightedRatio};

/// Available similarity strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scorer {
    /// Token-aware weighted ratio (default)
    #[default]
    Wratio,
    /// nucleo fuzzy matcher, normalized to 0-100
    Nucleo,
}

impl Scorer {
    pub fn build(self) -> Box<dyn Similarity> {
        match self {
            Scorer::Wratio => Box::new(WeightedRatio),
            Scorer::Nucleo => Box::new(NucleoSimilarity::new()),
        }
    }
}
