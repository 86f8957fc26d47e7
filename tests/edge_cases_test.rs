/// Edge case integration tests
///
/// These tests cover filesystem quirks, unusual index lines and other boundary scenarios
mod common;

use std::fs;

use amber_agent::context::ContextLoader;
use amber_agent::index_storage::{IndexStore, JsonIndexStore};
use amber_agent::indexer::build_index_from_file;
use amber_agent::slices::{FsSliceStore, SliceStore};
use amber_agent::{AgentError, storage_key};
use common::DocsDirBuilder;

#[test]
fn test_edge_case_crlf_index_section() {
    let workspace = DocsDirBuilder::new().with_index_section("angle 3\r\ndistance ... 4-6\r\n\r\n");
    let (index, report) = build_index_from_file(&workspace.index_section_path()).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(report.unrecognized, 0);
}

#[test]
fn test_edge_case_symbol_names_get_distinct_safe_keys() {
    let workspace = DocsDirBuilder::new()
        .with_index_section("rms/fit 3\nrms.fit 4\nrms:fit 5\n..a 6\n")
        .with_manual(&common::sample_manual())
        .built();

    let slices = FsSliceStore::new(&workspace.docs_dir());
    let keys = slices.page_keys().unwrap();
    assert_eq!(keys.len(), 4, "keys: {:?}", keys);
    for key in &keys {
        assert!(!key.contains('/') && !key.contains('.'), "unsafe key {}", key);
    }

    // Every artifact stays inside the slices directory
    for entry in fs::read_dir(slices.dir()).unwrap() {
        assert_eq!(entry.unwrap().path().parent().unwrap(), slices.dir());
    }
    assert_eq!(slices.pages(&storage_key("rms/fit")).unwrap().unwrap().pages[0].number, 3);
    assert_eq!(slices.pages(&storage_key("rms:fit")).unwrap().unwrap().pages[0].number, 5);
}

#[test]
fn test_edge_case_multi_word_name_gets_slice() {
    let workspace = DocsDirBuilder::new()
        .with_index_section("atomic fluctuations, 4, 5\nrms 9\n")
        .with_manual(&common::sample_manual())
        .built();

    let index = JsonIndexStore::new(workspace.docs_dir()).load().unwrap();
    assert_eq!(index.len(), 2);

    let slices = FsSliceStore::new(&workspace.docs_dir());
    let key = storage_key("Atomic Fluctuations");
    assert!(!key.contains(' '));
    let excerpt = slices.pages(&key).unwrap().unwrap();
    let numbers: Vec<u32> = excerpt.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![4, 5]);
}

#[test]
fn test_edge_case_duplicate_names_across_lines_merge() {
    let workspace = DocsDirBuilder::new()
        .with_index_section("HBond 7\nhbond, 9\nhbond 2-3\n")
        .with_manual(&common::sample_manual())
        .built();

    let index = JsonIndexStore::new(workspace.docs_dir()).load().unwrap();
    assert_eq!(index.len(), 1);
    let entry = index.get("hbond").unwrap();
    assert_eq!(entry.name, "HBond");
    assert_eq!((entry.start, entry.end), (2, 9));
}

#[test]
fn test_edge_case_manual_without_page_breaks_is_one_page() {
    let workspace = DocsDirBuilder::new()
        .with_index_section("angle 1\ndistance 2\n")
        .with_manual("the whole manual on one page")
        .built();

    let slices = FsSliceStore::new(&workspace.docs_dir());
    assert!(slices.pages("angle").unwrap().is_some());
    assert!(slices.pages("distance").unwrap().is_none());
}

#[test]
fn test_edge_case_multibyte_context_truncation() {
    let manual = ["ångström Å β-sheet α-helix"; 3].join("\x0c");
    let workspace = DocsDirBuilder::new()
        .with_index_section("secstruct 1-3\n")
        .with_manual(&manual)
        .built();

    let index = JsonIndexStore::new(workspace.docs_dir()).load().unwrap();
    let slices = FsSliceStore::new(&workspace.docs_dir());
    let loader = ContextLoader::new(&index, &slices);

    for max_chars in [1, 2, 9, 10, 11, 27, 200] {
        let loaded = loader.load("secstruct", max_chars).unwrap();
        assert!(loaded.text.chars().count() <= max_chars);
        assert!(manual.replace('\x0c', "\n").starts_with(&loaded.text));
    }
}

#[test]
fn test_edge_case_rebuild_replaces_previous_artifacts() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();
    let slices_dir = workspace.docs_dir().join("slices");
    assert!(slices_dir.join("radgyr.pages").exists());

    fs::write(workspace.index_section_path(), "angle 3\n").unwrap();
    let workspace = workspace.built();

    assert!(!slices_dir.join("radgyr.pages").exists());
    assert!(!slices_dir.join("radgyr.txt").exists());
    assert_eq!(JsonIndexStore::new(workspace.docs_dir()).load().unwrap().len(), 1);
}

#[test]
fn test_edge_case_corrupt_index_is_configuration_error() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();
    fs::write(workspace.docs_dir().join("index.json"), "{\"version\":1,\"entries\":").unwrap();

    let err = JsonIndexStore::new(workspace.docs_dir()).load().unwrap_err();
    assert!(matches!(err, AgentError::Configuration(_)));
}

#[test]
fn test_edge_case_hand_edited_inverted_span_is_rejected() {
    let workspace = DocsDirBuilder::new();
    fs::create_dir_all(workspace.docs_dir()).unwrap();
    fs::write(
        workspace.docs_dir().join("index.json"),
        r#"{"version":1,"entries":{"rms":{"name":"rms","start":9,"end":3}}}"#,
    )
    .unwrap();

    let err = JsonIndexStore::new(workspace.docs_dir()).load().unwrap_err();
    assert!(err.to_string().contains("rebuild the index"));
}
