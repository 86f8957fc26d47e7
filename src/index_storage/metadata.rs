//! Build metadata for staleness detection

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indexer::BuildReport;
use crate::slices::SliceOptions;

/// Metadata schema version for invalidation on format changes
pub const METADATA_VERSION: u32 = 1;

/// Top-level build metadata, written next to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub version: u32,
    pub built_at: DateTime<Utc>,
    pub index_section: PathBuf,
    pub reference: ReferenceFileMetadata,
    pub entry_count: usize,
    pub merged_duplicates: usize,
    pub skipped_lines: usize,
    pub slicing: SliceOptions,
    pub sliced: usize,
    pub text_artifacts: usize,
}

impl IndexMetadata {
    pub fn new(
        index_section: &Path,
        reference: ReferenceFileMetadata,
        report: &BuildReport,
        slicing: SliceOptions,
    ) -> Self {
        Self {
            version: METADATA_VERSION,
            built_at: Utc::now(),
            index_section: index_section.to_path_buf(),
            reference,
            entry_count: report.entries,
            merged_duplicates: report.merged,
            skipped_lines: report.skipped(),
            slicing,
            sliced: 0,
            text_artifacts: 0,
        }
    }
}

/// Metadata for the reference document the slices were cut from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFileMetadata {
    pub path: PathBuf,
    pub mtime_secs: i64,
    pub size: u64,
    pub page_count: u32,
}

impl ReferenceFileMetadata {
    /// Create metadata from file path
    pub fn from_path(path: &Path, page_count: u32) -> anyhow::Result<Self> {
        let metadata = fs::metadata(path)?;
        let mtime = metadata.modified()?;
        let mtime_secs = mtime.duration_since(SystemTime::UNIX_EPOCH)?.as_secs() as i64;

        Ok(Self { path: path.to_path_buf(), mtime_secs, size: metadata.len(), page_count })
    }

    /// Check if the reference document has changed since the build (mtime or size differs)
    pub fn is_stale(&self) -> anyhow::Result<bool> {
        let current = Self::from_path(&self.path, self.page_count)?;
        Ok(self.mtime_secs != current.mtime_secs || self.size != current.size)
    }
}
