//! Per-command slice artifacts cut from the reference document.
//!
//! A build runs in two passes:
//! 1. [`build_slices`] clears the store and writes one page artifact per index entry
//! 2. [`derive_text_artifacts`] writes the text form of every page artifact; it can also be
//!    run later on its own

pub mod builder;
pub mod store;

pub use builder::{SliceOptions, SliceReport, build_slices, derive_text_artifacts};
pub use store::{FsSliceStore, MemorySliceStore, SliceStore};
