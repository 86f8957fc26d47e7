//! Persistent document index storage
//!
//! Two JSON files live in the docs directory:
//! - `index.json`: the canonical name → page span mapping (keys sorted, round-trips exactly)
//! - `index-metadata.json`: build metadata (reference document size/mtime, slicing options,
//!   counts) used to report stale artifacts
//!
//! Both are written atomically (temp file + rename). A rebuild always replaces them.

pub mod metadata;
pub mod persistence;

pub use metadata::{IndexMetadata, METADATA_VERSION, ReferenceFileMetadata};
pub use persistence::{
    INDEX_FILENAME, INDEX_VERSION, IndexStore, JsonIndexStore, METADATA_FILENAME,
    MemoryIndexStore, decode_index, encode_index,
};
