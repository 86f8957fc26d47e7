//! Index building for the command reference manual.
//!
//! # Error Handling Strategy
//!
//! The indexer tolerates individual bad lines but not a useless result:
//!
//! - **Line-level failures**: Unrecognized lines and inverted spans are skipped and counted in
//!   the [`BuildReport`], so one malformed line never breaks the build.
//!
//! - **Whole-build failure**: Zero valid entries means the wrong file was supplied, and the
//!   build fails with a configuration error instead of persisting an empty index.
//!
//! - **Summary reporting**: The report carries entry, merge and skip counts for the CLI to
//!   print after a build.

pub mod builder;

pub use builder::{BuildReport, build_document_index, build_index_from_file, read_index_section};
