use crate::error::AgentError;
use crate::models::PageExcerpt;
use crate::slices::SliceStore;

/// Which artifact the context text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Precomputed,
    Derived,
}

/// Where the grounding text for one command comes from, chosen by availability:
/// a precomputed text artifact if present, otherwise text derived from the page artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Precomputed(String),
    Derived(PageExcerpt),
}

impl ContentSource {
    /// `Ok(None)` when neither artifact exists for `key`
    pub fn resolve(store: &dyn SliceStore, key: &str) -> Result<Option<Self>, AgentError> {
        if let Some(text) = store.text(key)? {
            return Ok(Some(ContentSource::Precomputed(text)));
        }
        Ok(store.pages(key)?.map(ContentSource::Derived))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ContentSource::Precomputed(_) => SourceKind::Precomputed,
            ContentSource::Derived(_) => SourceKind::Derived,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ContentSource::Precomputed(text) => text,
            ContentSource::Derived(excerpt) => excerpt.to_text(),
        }
    }
}
