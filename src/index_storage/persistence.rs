//! Index persistence: load/save with atomic writes

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::metadata::{IndexMetadata, METADATA_VERSION};
use crate::error::AgentError;
use crate::models::{DocumentIndex, IndexEntry};
use crate::utils::write_atomic;

pub const INDEX_FILENAME: &str = "index.json";
pub const METADATA_FILENAME: &str = "index-metadata.json";

/// On-disk index schema version
pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    entries: BTreeMap<String, IndexEntry>,
}

/// Where the document index lives between a build and later queries
pub trait IndexStore {
    /// Load the persisted index
    ///
    /// # Errors
    ///
    /// A missing, unreadable or corrupt index is a configuration error: the build step has
    /// not been run (or its output was damaged).
    fn load(&self) -> Result<DocumentIndex, AgentError>;

    /// Replace the persisted index entirely
    fn save(&mut self, index: &DocumentIndex) -> Result<(), AgentError>;
}

/// Serialize an index to its canonical JSON form (keys sorted)
pub fn encode_index(index: &DocumentIndex) -> Result<String, AgentError> {
    let persisted = PersistedIndex { version: INDEX_VERSION, entries: index.as_map().clone() };
    serde_json::to_string_pretty(&persisted)
        .map_err(|e| AgentError::config(format!("failed to serialize index: {}", e)))
}

/// Parse and validate the canonical JSON form
pub fn decode_index(json: &str) -> Result<DocumentIndex, AgentError> {
    let persisted: PersistedIndex = serde_json::from_str(json)
        .map_err(|e| AgentError::config(format!("failed to parse index JSON: {}", e)))?;

    if persisted.version != INDEX_VERSION {
        return Err(AgentError::config(format!(
            "index version mismatch (expected {}, found {}), rebuild the index",
            INDEX_VERSION, persisted.version
        )));
    }

    for (key, entry) in &persisted.entries {
        if *key != entry.key() || entry.start == 0 || entry.end < entry.start {
            return Err(AgentError::config(format!(
                "corrupt index entry '{}' ({}-{}), rebuild the index",
                key, entry.start, entry.end
            )));
        }
    }

    Ok(DocumentIndex::from_map(persisted.entries))
}

/// JSON index file inside the docs directory
#[derive(Debug, Clone)]
pub struct JsonIndexStore {
    docs_dir: PathBuf,
}

impl JsonIndexStore {
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        Self { docs_dir: docs_dir.into() }
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.docs_dir.join(INDEX_FILENAME)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.docs_dir.join(METADATA_FILENAME)
    }

    /// Load build metadata. Returns None if missing, corrupted or from another schema version.
    pub fn load_metadata(&self) -> Option<IndexMetadata> {
        let path = self.metadata_path();
        if !path.exists() {
            return None;
        }

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read index metadata");
                return None;
            }
        };
        let metadata: IndexMetadata = match serde_json::from_str(&json) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse index metadata");
                return None;
            }
        };

        if metadata.version != METADATA_VERSION {
            warn!(
                expected = METADATA_VERSION,
                found = metadata.version,
                "index metadata version mismatch, ignoring"
            );
            return None;
        }
        Some(metadata)
    }

    /// Save build metadata atomically
    pub fn save_metadata(&self, metadata: &IndexMetadata) -> Result<(), AgentError> {
        self.ensure_dir()?;
        let path = self.metadata_path();
        let json = serde_json::to_string_pretty(metadata)
            .map_err(|e| AgentError::config(format!("failed to serialize index metadata: {}", e)))?;
        write_atomic(&path, json.as_bytes()).map_err(|e| AgentError::io(&path, e))
    }

    fn ensure_dir(&self) -> Result<(), AgentError> {
        if !self.docs_dir.exists() {
            fs::create_dir_all(&self.docs_dir).map_err(|e| AgentError::io(&self.docs_dir, e))?;
        }
        Ok(())
    }
}

impl IndexStore for JsonIndexStore {
    fn load(&self) -> Result<DocumentIndex, AgentError> {
        let path = self.index_path();
        if !path.exists() {
            return Err(AgentError::config(format!(
                "{} not found. Run: amber-agent build --index-section <FILE> --manual <FILE>",
                path.display()
            )));
        }
        let json = fs::read_to_string(&path).map_err(|e| AgentError::io(&path, e))?;
        decode_index(&json)
    }

    fn save(&mut self, index: &DocumentIndex) -> Result<(), AgentError> {
        self.ensure_dir()?;
        let path = self.index_path();
        let json = encode_index(index)?;
        write_atomic(&path, json.as_bytes()).map_err(|e| AgentError::io(&path, e))
    }
}

/// In-memory index store for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryIndexStore {
    index: Option<DocumentIndex>,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: DocumentIndex) -> Self {
        Self { index: Some(index) }
    }
}

impl IndexStore for MemoryIndexStore {
    fn load(&self) -> Result<DocumentIndex, AgentError> {
        self.index.clone().ok_or_else(|| AgentError::config("index has not been built"))
    }

    fn save(&mut self, index: &DocumentIndex) -> Result<(), AgentError> {
        self.index = Some(index.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> DocumentIndex {
        [
            IndexEntry::new("Distance", 245, 247).unwrap(),
            IndexEntry::new("rms", 88, 90).unwrap(),
            IndexEntry::new("nativecontacts/mindist", 60, 60).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_json_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = JsonIndexStore::new(dir.path().join("docs"));

        let index = sample_index();
        store.save(&index).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.get("distance").unwrap().name, "Distance");
    }

    #[test]
    fn test_save_overwrites_previous_index() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = JsonIndexStore::new(dir.path());

        store.save(&sample_index()).unwrap();
        let smaller: DocumentIndex = [IndexEntry::new("hbond", 1, 2).unwrap()].into_iter().collect();
        store.save(&smaller).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get("distance").is_none());
    }

    #[test]
    fn test_encoding_is_canonical() {
        let json = encode_index(&sample_index()).unwrap();
        assert_eq!(json, encode_index(&decode_index(&json).unwrap()).unwrap());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["entries"]["distance"]["start"], 245);
        assert_eq!(value["entries"]["distance"]["end"], 247);
    }

    #[test]
    fn test_missing_index_is_configuration_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonIndexStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
        assert!(err.to_string().contains("amber-agent build"));
    }

    #[test]
    fn test_corrupt_index_rejected() {
        assert!(decode_index("not json").is_err());
        assert!(decode_index(r#"{"version":99,"entries":{}}"#).is_err());
        assert!(
            decode_index(r#"{"version":1,"entries":{"rms":{"name":"rms","start":9,"end":3}}}"#)
                .is_err()
        );
        assert!(
            decode_index(r#"{"version":1,"entries":{"rms":{"name":"other","start":1,"end":3}}}"#)
                .is_err()
        );
    }

    #[test]
    fn test_metadata_missing_or_corrupt_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonIndexStore::new(dir.path());
        assert!(store.load_metadata().is_none());

        fs::write(store.metadata_path(), "{broken").unwrap();
        assert!(store.load_metadata().is_none());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryIndexStore::new();
        assert!(store.load().is_err());
        store.save(&sample_index()).unwrap();
        assert_eq!(store.load().unwrap().len(), 3);
    }
}
