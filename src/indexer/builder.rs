//! Document index builder.
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach, bounded by one hard rule:
//!
//! - **Line-level problems**: Unrecognized lines are skipped (logged at debug level). Lines
//!   whose span is inverted or starts at page 0 are skipped with a warning.
//! - **Duplicates**: A command listed several times is merged into one entry covering the
//!   union of its spans.
//! - **Whole-build failure**: An index section that yields zero usable entries is treated as a
//!   misconfiguration and fails the build with [`AgentError::Configuration`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::models::{DocumentIndex, IndexEntry, InsertOutcome};
use crate::parsers::{LineOutcome, parse_index_line};
use crate::utils::{MAX_INDEX_SECTION_BYTES, validate_file_size};

/// Counts collected while building an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub lines: usize,
    pub entries: usize,
    pub merged: usize,
    pub ignored: usize,
    pub unrecognized: usize,
    pub invalid: usize,
}

impl BuildReport {
    pub fn skipped(&self) -> usize {
        self.unrecognized + self.invalid
    }
}

/// Build a [`DocumentIndex`] from the text of an index section
///
/// # Errors
///
/// Returns [`AgentError::Configuration`] if no line produced a valid entry.
///
/// # Examples
///
/// ```
/// use amber_agent::build_document_index;
///
/// let (index, report) = build_document_index("distance ... 245-247\nrms 88\n")?;
/// assert_eq!(index.len(), 2);
/// assert_eq!(report.entries, 2);
/// # Ok::<(), amber_agent::AgentError>(())
/// ```
pub fn build_document_index(text: &str) -> Result<(DocumentIndex, BuildReport), AgentError> {
    let mut index = DocumentIndex::new();
    let mut report = BuildReport::default();

    for (line_num, line) in text.lines().enumerate() {
        report.lines += 1;
        match parse_index_line(line) {
            LineOutcome::Entry(parsed) => {
                // parse_index_line only emits spans with 1 <= start <= end
                let Some(entry) = IndexEntry::new(parsed.name, parsed.start, parsed.end) else {
                    report.invalid += 1;
                    continue;
                };
                if index.insert(entry) == InsertOutcome::Merged {
                    report.merged += 1;
                }
            }
            LineOutcome::Ignored => report.ignored += 1,
            LineOutcome::Unrecognized => {
                report.unrecognized += 1;
                debug!(line = line_num + 1, text = line.trim(), "skipping unrecognized index line");
            }
            LineOutcome::InvalidSpan { name, start, end } => {
                report.invalid += 1;
                warn!(line = line_num + 1, %name, start, end, "skipping index entry with invalid page span");
            }
        }
    }

    report.entries = index.len();
    if index.is_empty() {
        return Err(AgentError::config(format!(
            "index section yielded no valid entries ({} lines read, {} skipped)",
            report.lines,
            report.skipped()
        )));
    }

    info!(
        entries = report.entries,
        merged = report.merged,
        skipped = report.skipped(),
        "built document index"
    );
    Ok((index, report))
}

/// Read the index section text from disk
pub fn read_index_section(path: &Path) -> Result<String, AgentError> {
    let mut file = File::open(path).map_err(|e| {
        AgentError::config(format!("index section {} not readable: {}", path.display(), e))
    })?;
    validate_file_size(&file, path, MAX_INDEX_SECTION_BYTES)
        .map_err(|e| AgentError::config(e.to_string()))?;

    let mut text = String::new();
    file.read_to_string(&mut text).map_err(|e| {
        AgentError::config(format!("index section {} is not UTF-8 text: {}", path.display(), e))
    })?;
    Ok(text)
}

/// Read and build in one step
pub fn build_index_from_file(path: &Path) -> Result<(DocumentIndex, BuildReport), AgentError> {
    let text = read_index_section(path)?;
    build_document_index(&text)
}
