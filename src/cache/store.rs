//! Response cache backends.
//!
//! The cache is advisory: callers treat every [`CacheError`] as a miss (reads) or a no-op
//! (writes). Corrupt or foreign files in the cache directory are never returned as hits.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::fingerprint::Fingerprint;
use crate::error::CacheError;
use crate::models::CacheRecord;
use crate::utils::write_atomic;

const RECORD_EXTENSION: &str = "json";

/// Pluggable response cache keyed by request fingerprint
pub trait ResponseCache {
    /// `Ok(None)` on a miss
    fn get(&self, key: &Fingerprint) -> Result<Option<CacheRecord>, CacheError>;

    /// Insert or overwrite the record stored under `record.key`
    fn put(&mut self, record: CacheRecord) -> Result<(), CacheError>;

    /// Remove every record, returning how many were removed
    fn clear(&mut self) -> Result<usize, CacheError>;
}

/// One JSON file per record: `<dir>/<fingerprint>.json`
#[derive(Debug, Clone)]
pub struct FsResponseCache {
    dir: PathBuf,
}

impl FsResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.{}", key, RECORD_EXTENSION))
    }

    /// Number of record files currently stored
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.record_files()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    fn record_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let io_err = |source| CacheError::Io { path: self.dir.clone(), source };
        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = dir_entry.map_err(io_err)?.path();
            let is_record = path.extension().is_some_and(|ext| ext == RECORD_EXTENSION)
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| Fingerprint::parse(stem).is_some());
            if is_record {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl ResponseCache for FsResponseCache {
    fn get(&self, key: &Fingerprint) -> Result<Option<CacheRecord>, CacheError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .map_err(|source| CacheError::Io { path: path.clone(), source })?;
        let record: CacheRecord = serde_json::from_str(&json)
            .map_err(|e| CacheError::Corrupt { path: path.clone(), reason: e.to_string() })?;

        if record.key != *key {
            return Err(CacheError::Corrupt {
                path,
                reason: format!("record key {} does not match file name", record.key),
            });
        }
        Ok(Some(record))
    }

    fn put(&mut self, record: CacheRecord) -> Result<(), CacheError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .map_err(|source| CacheError::Io { path: self.dir.clone(), source })?;
        }
        let path = self.record_path(&record.key);
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| CacheError::Corrupt { path: path.clone(), reason: e.to_string() })?;
        write_atomic(&path, json.as_bytes()).map_err(|source| CacheError::Io { path, source })
    }

    fn clear(&mut self) -> Result<usize, CacheError> {
        let files = self.record_files()?;
        for path in &files {
            fs::remove_file(path).map_err(|source| CacheError::Io { path: path.clone(), source })?;
        }
        debug!(dir = %self.dir.display(), removed = files.len(), "cleared response cache");
        Ok(files.len())
    }
}

/// In-memory cache for tests and cache-less runs
#[derive(Debug, Clone, Default)]
pub struct MemoryResponseCache {
    records: BTreeMap<Fingerprint, CacheRecord>,
}

impl MemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ResponseCache for MemoryResponseCache {
    fn get(&self, key: &Fingerprint) -> Result<Option<CacheRecord>, CacheError> {
        Ok(self.records.get(key).cloned())
    }

    fn put(&mut self, record: CacheRecord) -> Result<(), CacheError> {
        self.records.insert(record.key.clone(), record);
        Ok(())
    }

    fn clear(&mut self) -> Result<usize, CacheError> {
        let removed = self.records.len();
        self.records.clear();
        Ok(removed)
    }
}
