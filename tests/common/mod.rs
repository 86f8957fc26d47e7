//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use amber_agent::index_storage::{IndexStore, JsonIndexStore};
use amber_agent::indexer::build_index_from_file;
use amber_agent::parsers::ReferenceDocument;
use amber_agent::slices::{FsSliceStore, SliceOptions, build_slices, derive_text_artifacts};
use tempfile::TempDir;

/// A small index section covering the usual line shapes
pub const SAMPLE_INDEX_SECTION: &str = "Index\n\
angle ........ 3\n\
distance ... 4-6\n\
hbond, 7, 8\n\
rms p. 9\n\
rmsd 9-10\n\
see also radgyr\n\
radgyr 11\n\
nonsense line with no pages\n";

/// Number of pages in [`sample_manual`]
pub const SAMPLE_PAGE_COUNT: u32 = 12;

/// Manual text with form-feed page breaks; page `n` mentions its own number
pub fn sample_manual() -> String {
    (1..=SAMPLE_PAGE_COUNT)
        .map(|n| match n {
            3 => "angle <name> <mask1> <mask2> <mask3> [out <file>]".to_string(),
            4 => "distance [<name>] <mask1> <mask2> [out <filename>] [noimage]".to_string(),
            9 => "rms [<name>] [<mask>] [first | ref <name>] [nofit] [mass]".to_string(),
            _ => format!("manual page {}", n),
        })
        .collect::<Vec<_>>()
        .join("\x0c")
}

/// Builder for a temp workspace holding the manual inputs, docs dir and cache dir
pub struct DocsDirBuilder {
    temp_dir: TempDir,
}

impl DocsDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn index_section_path(&self) -> PathBuf {
        self.root().join("index-section.txt")
    }

    pub fn manual_path(&self) -> PathBuf {
        self.root().join("manual.txt")
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root().join("docs")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root().join("cache")
    }

    pub fn with_index_section(self, content: &str) -> Self {
        fs::write(self.index_section_path(), content).expect("Failed to write index section");
        self
    }

    pub fn with_manual(self, content: &str) -> Self {
        fs::write(self.manual_path(), content).expect("Failed to write manual");
        self
    }

    /// Sample index section and manual
    pub fn with_sample_inputs(self) -> Self {
        self.with_index_section(SAMPLE_INDEX_SECTION).with_manual(&sample_manual())
    }

    /// Run a full build in-process with default slicing
    pub fn built(self) -> Self {
        self.built_with(SliceOptions::default())
    }

    pub fn built_with(self, options: SliceOptions) -> Self {
        let (index, _) = build_index_from_file(&self.index_section_path()).expect("index build failed");
        JsonIndexStore::new(self.docs_dir()).save(&index).expect("index save failed");

        let reference = ReferenceDocument::open(&self.manual_path()).expect("manual not readable");
        let mut slices = FsSliceStore::new(&self.docs_dir());
        build_slices(&index, &reference, &mut slices, options).expect("slice build failed");
        derive_text_artifacts(&mut slices).expect("text derivation failed");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for DocsDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}
