//! Bounded grounding context for a matched command.

pub mod loader;
pub mod source;

pub use loader::{ContextLoader, DEFAULT_MAX_CHARS, LoadedContext, truncate_chars};
pub use source::{ContentSource, SourceKind};
