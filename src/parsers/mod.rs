//! Parsers for the two input documents: the index section and the reference manual.
//!
//! # Error Handling Strategy
//!
//! Index-section parsing is **per-line tolerant**: every line is classified on its own
//! ([`LineOutcome`]) and unrecognized or invalid lines never abort parsing. Deciding
//! whether the result as a whole is usable is left to the index builder.
//!
//! The reference document is all-or-nothing: a missing, oversized or non-UTF-8 manual is
//! a configuration error.

pub mod index_section;
pub mod reference;

pub use index_section::{LineOutcome, ParsedLine, parse_index_line};
pub use reference::{PAGE_BREAK, ReferenceDocument};
