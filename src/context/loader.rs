use tracing::debug;

use super::source::{ContentSource, SourceKind};
use crate::error::AgentError;
use crate::models::DocumentIndex;
use crate::slices::SliceStore;
use crate::utils::storage_key;

/// Default cap on grounding text, in characters
pub const DEFAULT_MAX_CHARS: usize = 12_000;

/// Bounded grounding text for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedContext {
    /// At most `max_chars` characters, a prefix of the full text
    pub text: String,
    pub truncated: bool,
    pub source: SourceKind,
}

/// Keep the first `max_chars` characters. Never splits a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Loads grounding text for indexed commands from a [`SliceStore`]
pub struct ContextLoader<'a> {
    index: &'a DocumentIndex,
    slices: &'a dyn SliceStore,
}

impl<'a> ContextLoader<'a> {
    pub fn new(index: &'a DocumentIndex, slices: &'a dyn SliceStore) -> Self {
        Self { index, slices }
    }

    /// # Errors
    ///
    /// [`AgentError::MissingDocumentation`] if `entry_name` is not indexed or has no artifact.
    pub fn load(&self, entry_name: &str, max_chars: usize) -> Result<LoadedContext, AgentError> {
        let key = storage_key(entry_name);
        let missing = || AgentError::MissingDocumentation {
            name: entry_name.to_string(),
            location: self.slices.location(&key),
        };

        if self.index.get(entry_name).is_none() {
            return Err(missing());
        }
        let source = ContentSource::resolve(self.slices, &key)?.ok_or_else(missing)?;
        let kind = source.kind();
        let full = source.into_text();

        let (text, truncated) = truncate_chars(&full, max_chars);
        debug!(name = entry_name, source = ?kind, chars = text.chars().count(), truncated, "loaded context");
        Ok(LoadedContext { text: text.to_string(), truncated, source: kind })
    }
}
