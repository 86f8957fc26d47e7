use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::AgentError;
use crate::models::Page;
use crate::utils::{MAX_REFERENCE_BYTES, validate_file_size};

/// Page separator used by `pdftotext` and most text exporters
pub const PAGE_BREAK: char = '\x0c';

/// The full reference manual as 1-based pages of text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDocument {
    pages: Vec<String>,
}

impl ReferenceDocument {
    /// Split text on form feeds. A trailing empty segment after the last break is not a page.
    pub fn from_text(text: &str) -> Self {
        let mut pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        if pages.len() == 1 && pages[0].is_empty() {
            pages.clear();
        }
        Self { pages }
    }

    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { pages: pages.into_iter().map(Into::into).collect() }
    }

    /// Read the reference document from disk.
    ///
    /// # Errors
    ///
    /// A missing, unreadable, oversized or non-UTF-8 file is a configuration error.
    pub fn open(path: &Path) -> Result<Self, AgentError> {
        let mut file = File::open(path).map_err(|e| {
            AgentError::config(format!("reference document {} not readable: {}", path.display(), e))
        })?;
        validate_file_size(&file, path, MAX_REFERENCE_BYTES)
            .map_err(|e| AgentError::config(e.to_string()))?;

        let mut text = String::new();
        file.read_to_string(&mut text).map_err(|e| {
            AgentError::config(format!("reference document {} is not UTF-8 text: {}", path.display(), e))
        })?;

        let document = Self::from_text(&text);
        debug!(path = %path.display(), pages = document.page_count(), "loaded reference document");
        Ok(document)
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn page(&self, number: u32) -> Option<&str> {
        let idx = number.checked_sub(1)? as usize;
        self.pages.get(idx).map(String::as_str)
    }

    /// Clamp a 1-based inclusive span to the document. `None` if nothing overlaps.
    pub fn clamp_span(&self, start: u32, end: u32) -> Option<(u32, u32)> {
        let start = start.max(1);
        let end = end.min(self.page_count());
        (start <= end).then_some((start, end))
    }

    /// Pages `start..=end`, clamped to the document
    pub fn pages(&self, start: u32, end: u32) -> Vec<Page> {
        match self.clamp_span(start, end) {
            Some((start, end)) => (start..=end)
                .filter_map(|number| {
                    self.page(number).map(|text| Page { number, text: text.to_string() })
                })
                .collect(),
            None => Vec::new(),
        }
    }
}
