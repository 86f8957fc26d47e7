//! Storage for per-command slice artifacts.
//!
//! Each indexed command owns up to two artifacts under its storage key
//! ([`crate::utils::storage_key`]):
//! - `<key>.pages`: the [`PageExcerpt`], bincode-encoded
//! - `<key>.txt`: the plain-text form, derived from the page artifact

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bincode::config;

use crate::error::AgentError;
use crate::models::PageExcerpt;
use crate::utils::paths::keyed_path;
use crate::utils::write_atomic;

pub const SLICES_DIR_NAME: &str = "slices";
pub const PAGES_EXTENSION: &str = "pages";
pub const TEXT_EXTENSION: &str = "txt";

pub trait SliceStore {
    fn put_pages(&mut self, key: &str, excerpt: &PageExcerpt) -> Result<(), AgentError>;

    /// `Ok(None)` when no page artifact exists for `key`
    fn pages(&self, key: &str) -> Result<Option<PageExcerpt>, AgentError>;

    fn put_text(&mut self, key: &str, text: &str) -> Result<(), AgentError>;

    /// `Ok(None)` when no text artifact exists for `key`
    fn text(&self, key: &str) -> Result<Option<String>, AgentError>;

    /// Keys that have a page artifact, sorted
    fn page_keys(&self) -> Result<Vec<String>, AgentError>;

    /// Remove every artifact
    fn clear(&mut self) -> Result<(), AgentError>;

    /// Where the artifacts for `key` are expected, for diagnostics
    fn location(&self, key: &str) -> PathBuf;
}

/// Slice artifacts as files in `<docs>/slices`
#[derive(Debug, Clone)]
pub struct FsSliceStore {
    dir: PathBuf,
}

impl FsSliceStore {
    pub fn new(docs_dir: &Path) -> Self {
        Self { dir: docs_dir.join(SLICES_DIR_NAME) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<(), AgentError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| AgentError::io(&self.dir, e))?;
        }
        Ok(())
    }
}

impl SliceStore for FsSliceStore {
    fn put_pages(&mut self, key: &str, excerpt: &PageExcerpt) -> Result<(), AgentError> {
        self.ensure_dir()?;
        let path = keyed_path(&self.dir, key, PAGES_EXTENSION);
        let bytes = bincode::serde::encode_to_vec(excerpt, config::standard()).map_err(|e| {
            AgentError::config(format!("failed to encode slice for '{}': {}", excerpt.name, e))
        })?;
        write_atomic(&path, &bytes).map_err(|e| AgentError::io(&path, e))
    }

    fn pages(&self, key: &str) -> Result<Option<PageExcerpt>, AgentError> {
        let path = keyed_path(&self.dir, key, PAGES_EXTENSION);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|e| AgentError::io(&path, e))?;
        let (excerpt, _) = bincode::serde::decode_from_slice(&bytes, config::standard())
            .map_err(|e| {
                AgentError::config(format!("corrupt slice artifact {}: {}", path.display(), e))
            })?;
        Ok(Some(excerpt))
    }

    fn put_text(&mut self, key: &str, text: &str) -> Result<(), AgentError> {
        self.ensure_dir()?;
        let path = keyed_path(&self.dir, key, TEXT_EXTENSION);
        write_atomic(&path, text.as_bytes()).map_err(|e| AgentError::io(&path, e))
    }

    fn text(&self, key: &str) -> Result<Option<String>, AgentError> {
        let path = keyed_path(&self.dir, key, TEXT_EXTENSION);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some).map_err(|e| AgentError::io(&path, e))
    }

    fn page_keys(&self) -> Result<Vec<String>, AgentError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.dir).map_err(|e| AgentError::io(&self.dir, e))? {
            let path = dir_entry.map_err(|e| AgentError::io(&self.dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == PAGES_EXTENSION)
                && let Some(stem) = path.file_stem()
            {
                keys.push(stem.to_string_lossy().into_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn clear(&mut self) -> Result<(), AgentError> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir).map_err(|e| AgentError::io(&self.dir, e))?;
        }
        fs::create_dir_all(&self.dir).map_err(|e| AgentError::io(&self.dir, e))
    }

    fn location(&self, key: &str) -> PathBuf {
        keyed_path(&self.dir, key, PAGES_EXTENSION)
    }
}

/// In-memory slice store for tests
#[derive(Debug, Clone, Default)]
pub struct MemorySliceStore {
    pages: BTreeMap<String, PageExcerpt>,
    texts: BTreeMap<String, String>,
}

impl MemorySliceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_text(&mut self, key: &str) -> Option<String> {
        self.texts.remove(key)
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }
}

impl SliceStore for MemorySliceStore {
    fn put_pages(&mut self, key: &str, excerpt: &PageExcerpt) -> Result<(), AgentError> {
        self.pages.insert(key.to_string(), excerpt.clone());
        Ok(())
    }

    fn pages(&self, key: &str) -> Result<Option<PageExcerpt>, AgentError> {
        Ok(self.pages.get(key).cloned())
    }

    fn put_text(&mut self, key: &str, text: &str) -> Result<(), AgentError> {
        self.texts.insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn text(&self, key: &str) -> Result<Option<String>, AgentError> {
        Ok(self.texts.get(key).cloned())
    }

    fn page_keys(&self) -> Result<Vec<String>, AgentError> {
        Ok(self.pages.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), AgentError> {
        self.pages.clear();
        self.texts.clear();
        Ok(())
    }

    fn location(&self, key: &str) -> PathBuf {
        PathBuf::from(format!("memory://{}", key))
    }
}
