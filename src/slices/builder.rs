//! Slice derivation: cut one excerpt per indexed command out of the reference document.
//!
//! # Error Handling Strategy
//!
//! - **Out-of-range spans**: Clamped to the document bounds and logged. An entry whose span
//!   lies entirely outside the document gets no artifact (warning), and querying it later
//!   reports missing documentation. One bad entry never fails the build.
//! - **Storage failures**: Abort the build. The store is cleared first, so a rerun starts
//!   from scratch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::store::SliceStore;
use crate::error::AgentError;
use crate::models::{DocumentIndex, IndexEntry, PageExcerpt};
use crate::parsers::ReferenceDocument;
use crate::utils::storage_key;

/// How index page numbers map onto reference document pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceOptions {
    /// Added to every indexed page number (printed vs physical page numbering)
    pub page_offset: i32,
    /// Extra pages included after each span
    pub trailing_pages: u32,
}

impl SliceOptions {
    /// Physical span for an entry before clamping; `None` if it ends before page 1
    fn physical_span(&self, entry: &IndexEntry) -> Option<(u32, u32)> {
        let offset = i64::from(self.page_offset);
        let start = i64::from(entry.start) + offset;
        let end = i64::from(entry.end) + offset + i64::from(self.trailing_pages);
        if end < 1 {
            return None;
        }
        let start = start.max(1);
        let end = end.min(i64::from(u32::MAX));
        Some((start as u32, end as u32))
    }
}

/// Outcome counts for a slice build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceReport {
    pub written: usize,
    pub clamped: usize,
    /// Entries with no page inside the document
    pub out_of_range: Vec<String>,
}

enum SlicePlan {
    Ready { key: String, excerpt: PageExcerpt, clamped: bool },
    OutOfRange { name: String, span: Option<(u32, u32)> },
}

fn plan_slice(entry: &IndexEntry, reference: &ReferenceDocument, options: SliceOptions) -> SlicePlan {
    let span = options.physical_span(entry);
    let Some((start, end)) = span.and_then(|(s, e)| reference.clamp_span(s, e)) else {
        return SlicePlan::OutOfRange { name: entry.name.clone(), span };
    };

    let excerpt = PageExcerpt {
        name: entry.name.clone(),
        requested_start: entry.start,
        requested_end: entry.end,
        pages: reference.pages(start, end),
    };
    SlicePlan::Ready { key: storage_key(&entry.name), excerpt, clamped: span != Some((start, end)) }
}

/// Destroy and recreate every page artifact from `reference`
pub fn build_slices(
    index: &DocumentIndex,
    reference: &ReferenceDocument,
    store: &mut dyn SliceStore,
    options: SliceOptions,
) -> Result<SliceReport, AgentError> {
    store.clear()?;

    let entries: Vec<&IndexEntry> = index.entries().collect();
    let plans: Vec<SlicePlan> =
        entries.par_iter().map(|entry| plan_slice(entry, reference, options)).collect();

    let mut report = SliceReport::default();
    for plan in plans {
        match plan {
            SlicePlan::Ready { key, excerpt, clamped } => {
                if clamped {
                    report.clamped += 1;
                    warn!(
                        name = %excerpt.name,
                        first = excerpt.first_page(),
                        last = excerpt.last_page(),
                        page_count = reference.page_count(),
                        "clamped slice to document bounds"
                    );
                }
                store.put_pages(&key, &excerpt)?;
                report.written += 1;
            }
            SlicePlan::OutOfRange { name, span } => {
                warn!(%name, ?span, page_count = reference.page_count(), "no pages in range, skipping slice");
                report.out_of_range.push(name);
            }
        }
    }

    info!(
        written = report.written,
        clamped = report.clamped,
        out_of_range = report.out_of_range.len(),
        "built slice artifacts"
    );
    Ok(report)
}

/// Derive a text artifact from every page artifact. Idempotent; safe to rerun on its own.
///
/// Corrupt page artifacts are skipped with a warning. Returns the number of text artifacts
/// written.
pub fn derive_text_artifacts(store: &mut dyn SliceStore) -> Result<usize, AgentError> {
    let mut written = 0;
    for key in store.page_keys()? {
        match store.pages(&key) {
            Ok(Some(excerpt)) => {
                store.put_text(&key, &excerpt.to_text())?;
                written += 1;
            }
            Ok(None) => debug!(%key, "page artifact vanished, skipping"),
            Err(e) => warn!(%key, error = %e, "skipping unreadable page artifact"),
        }
    }
    info!(written, "derived text artifacts");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slices::MemorySliceStore;

    fn reference(pages: u32) -> ReferenceDocument {
        ReferenceDocument::from_pages((1..=pages).map(|n| format!("page {} text", n)))
    }

    fn index(entries: &[(&str, u32, u32)]) -> DocumentIndex {
        entries.iter().map(|(name, s, e)| IndexEntry::new(*name, *s, *e).unwrap()).collect()
    }

    #[test]
    fn test_three_page_range_yields_three_pages() {
        let index = index(&[("distance", 245, 247)]);
        let mut store = MemorySliceStore::new();
        let report =
            build_slices(&index, &reference(300), &mut store, SliceOptions::default()).unwrap();

        assert_eq!(report.written, 1);
        let excerpt = store.pages("distance").unwrap().unwrap();
        assert_eq!(excerpt.pages.len(), 3);
        assert_eq!(excerpt.first_page(), Some(245));
        assert_eq!(excerpt.last_page(), Some(247));
        assert_eq!(excerpt.pages[0].text, "page 245 text");
    }

    #[test]
    fn test_out_of_bounds_is_clamped_not_fatal() {
        let index = index(&[("rms", 8, 15), ("hbond", 40, 42), ("angle", 2, 2)]);
        let mut store = MemorySliceStore::new();
        let report =
            build_slices(&index, &reference(10), &mut store, SliceOptions::default()).unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(report.clamped, 1);
        assert_eq!(report.out_of_range, vec!["hbond".to_string()]);

        let rms = store.pages("rms").unwrap().unwrap();
        assert_eq!((rms.first_page(), rms.last_page()), (Some(8), Some(10)));
        assert_eq!((rms.requested_start, rms.requested_end), (8, 15));
        assert!(store.pages("hbond").unwrap().is_none());
    }

    #[test]
    fn test_offset_and_trailing_pages() {
        let index = index(&[("rms", 5, 5)]);
        let mut store = MemorySliceStore::new();
        let options = SliceOptions { page_offset: 1, trailing_pages: 1 };
        build_slices(&index, &reference(20), &mut store, options).unwrap();

        let excerpt = store.pages("rms").unwrap().unwrap();
        let numbers: Vec<u32> = excerpt.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![6, 7]);
    }

    #[test]
    fn test_negative_offset_before_first_page() {
        let index = index(&[("rms", 1, 2), ("angle", 5, 5)]);
        let mut store = MemorySliceStore::new();
        let options = SliceOptions { page_offset: -3, trailing_pages: 0 };
        let report = build_slices(&index, &reference(20), &mut store, options).unwrap();

        assert_eq!(report.out_of_range, vec!["rms".to_string()]);
        let angle = store.pages("angle").unwrap().unwrap();
        assert_eq!(angle.first_page(), Some(2));
    }

    #[test]
    fn test_rebuild_destroys_previous_artifacts() {
        let mut store = MemorySliceStore::new();
        build_slices(&index(&[("old", 1, 1)]), &reference(5), &mut store, SliceOptions::default())
            .unwrap();
        derive_text_artifacts(&mut store).unwrap();

        build_slices(&index(&[("new", 2, 2)]), &reference(5), &mut store, SliceOptions::default())
            .unwrap();
        assert!(store.pages("old").unwrap().is_none());
        assert!(store.text("old").unwrap().is_none());
        assert!(store.pages("new").unwrap().is_some());
    }

    #[test]
    fn test_derive_text_is_idempotent() {
        let mut store = MemorySliceStore::new();
        build_slices(
            &index(&[("distance", 2, 3), ("rms", 4, 4)]),
            &reference(5),
            &mut store,
            SliceOptions::default(),
        )
        .unwrap();

        assert_eq!(derive_text_artifacts(&mut store).unwrap(), 2);
        let first = store.text("distance").unwrap().unwrap();
        assert_eq!(first, "page 2 text\npage 3 text");

        assert_eq!(derive_text_artifacts(&mut store).unwrap(), 2);
        assert_eq!(store.text("distance").unwrap().unwrap(), first);
    }

    #[test]
    fn test_names_are_stored_under_storage_keys() {
        let mut store = MemorySliceStore::new();
        build_slices(&index(&[("Rms/Fit", 1, 1)]), &reference(2), &mut store, SliceOptions::default())
            .unwrap();
        assert_eq!(store.page_keys().unwrap(), vec!["rms%2Ffit".to_string()]);
    }
}
