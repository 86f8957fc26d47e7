//! amber-agent - Plain-language requests to AMBER/cpptraj commands, grounded in the manual
//!
//! This library implements a small retrieval pipeline over the AMBER reference manual:
//!
//! - Building a command index from the manual's index section
//! - Cutting one documentation slice per indexed command out of the manual
//! - Fuzzy matching free-text queries against indexed command names
//! - Loading bounded grounding context for the matched command
//! - Caching generated answers by request fingerprint
//!
//! # Example
//!
//! ```
//! use amber_agent::build_document_index;
//! use amber_agent::matcher::{MatchOptions, WeightedRatio, match_candidates};
//!
//! let (index, _) = build_document_index("distance ... 245-247\nrms 88\nangle 12\n")?;
//! let matches = match_candidates(
//!     "calculate distance between atoms",
//!     index.entries(),
//!     MatchOptions::best(70),
//!     &WeightedRatio,
//! );
//! assert_eq!(matches[0].entry.name, "distance");
//! # Ok::<(), amber_agent::AgentError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod index_storage;
pub mod indexer;
pub mod matcher;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod slices;
pub mod utils;

// Re-export commonly used types
pub use error::{AgentError, CacheError, GenerationError};
pub use indexer::build_document_index;
pub use models::{DocumentIndex, IndexEntry, MatchCandidate};
pub use pipeline::{GenerateOptions, Orchestrator, Outcome};
pub use utils::paths::{format_path_with_tilde, storage_key};
