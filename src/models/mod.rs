//! Data models for the command documentation index.
//!
//! This module defines the data structures used throughout the application:
//!
//! - [`IndexEntry`] / [`DocumentIndex`] - Command name to page span mapping
//! - [`PageExcerpt`] - Binary slice artifact holding the pages for one command
//! - [`MatchCandidate`] - Ranked fuzzy-match result for a query
//! - [`CacheRecord`] - Stored generation result keyed by request fingerprint

pub mod cache;
pub mod index;
pub mod search;
pub mod slice;

pub use cache::CacheRecord;
pub use index::{DocumentIndex, IndexEntry, InsertOutcome, normalize_name};
pub use search::MatchCandidate;
pub use slice::{Page, PageExcerpt};
