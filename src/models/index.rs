use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

/// Normalize a command name into its case-insensitive index key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One documented command and its page span in the reference document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Display name, original casing preserved
    pub name: String,
    pub start: u32,
    pub end: u32,
}

impl IndexEntry {
    /// Returns `None` unless `1 <= start <= end`
    pub fn new(name: impl Into<String>, start: u32, end: u32) -> Option<Self> {
        if start == 0 || end < start {
            return None;
        }
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Self { name, start, end })
    }

    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Human-readable page span: `245` or `245-247`
    pub fn format_pages(&self) -> String {
        if self.start == self.end {
            self.start.to_string()
        } else {
            format!("{}-{}", self.start, self.end)
        }
    }

    fn absorb(&mut self, start: u32, end: u32) {
        self.start = self.start.min(start);
        self.end = self.end.max(end);
    }
}

/// Result of inserting an entry into a [`DocumentIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Merged,
}

/// Mapping from normalized command name to its [`IndexEntry`].
///
/// Keys are kept sorted so iteration (and therefore serialization) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, merging spans as a union when the normalized name already exists.
    /// The first-seen display casing is kept.
    pub fn insert(&mut self, entry: IndexEntry) -> InsertOutcome {
        match self.entries.entry(entry.key()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                InsertOutcome::Inserted
            }
            Entry::Occupied(mut slot) => {
                slot.get_mut().absorb(entry.start, entry.end);
                InsertOutcome::Merged
            }
        }
    }

    /// Look up by any casing of the command name
    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// `(key, entry)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn from_map(entries: BTreeMap<String, IndexEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, IndexEntry> {
        &self.entries
    }
}

impl FromIterator<IndexEntry> for DocumentIndex {
    fn from_iter<T: IntoIterator<Item = IndexEntry>>(iter: T) -> Self {
        let mut index = DocumentIndex::new();
        for entry in iter {
            index.insert(entry);
        }
        index
    }
}
