/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary and verify command-line behavior
mod common;

use std::fs;
use std::path::Path;
use std::process::Command;

use amber_agent::cache::{FingerprintInput, FsResponseCache, ResponseCache};
use amber_agent::models::CacheRecord;
use assert_cmd::prelude::*;
use common::DocsDirBuilder;
use predicates::prelude::*;

/// Binary isolated from the caller's environment and working directory
fn amber_agent(workspace: &DocsDirBuilder) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_amber-agent"));
    cmd.current_dir(workspace.root())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("AMBER_AGENT_DOCS_DIR")
        .env_remove("AMBER_AGENT_CACHE_DIR")
        .env_remove("RUST_LOG")
        .arg("--docs-dir")
        .arg(workspace.docs_dir())
        .arg("--cache-dir")
        .arg(workspace.cache_dir());
    cmd
}

fn seed_cache(cache_dir: &Path, query: &str, command: &str, answer: &str) {
    let key = FingerprintInput {
        program: "cpptraj",
        command,
        query,
        model: "gpt-4o-mini",
        temperature: 0.2,
        max_chars: 12_000,
    }
    .fingerprint();
    FsResponseCache::new(cache_dir)
        .put(CacheRecord::new(key, answer).with_request(command, "gpt-4o-mini"))
        .unwrap();
}

#[test]
fn test_cli_build_writes_index_and_slices() {
    let workspace = DocsDirBuilder::new().with_sample_inputs();

    amber_agent(&workspace)
        .arg("build")
        .arg("--index-section")
        .arg(workspace.index_section_path())
        .arg("--manual")
        .arg(workspace.manual_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Indexed 6 commands"))
        .stdout(predicate::str::contains("Wrote 6 slices"))
        .stdout(predicate::str::contains("Wrote 6 text artifacts"));

    let docs = workspace.docs_dir();
    assert!(docs.join("index.json").exists());
    assert!(docs.join("index-metadata.json").exists());
    assert!(docs.join("slices/distance.pages").exists());
    let text = fs::read_to_string(docs.join("slices/distance.txt")).unwrap();
    assert!(text.starts_with("distance [<name>] <mask1> <mask2>"));
    assert!(text.contains("manual page 6"));
}

#[test]
fn test_cli_build_skip_text_then_extract() {
    let workspace = DocsDirBuilder::new().with_sample_inputs();

    amber_agent(&workspace)
        .args(["build", "--skip-text", "--index-section"])
        .arg(workspace.index_section_path())
        .arg("--manual")
        .arg(workspace.manual_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("text artifacts").not());
    assert!(!workspace.docs_dir().join("slices/rms.txt").exists());

    amber_agent(&workspace)
        .arg("extract-text")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 6 text artifacts"));
    assert!(workspace.docs_dir().join("slices/rms.txt").exists());
}

#[test]
fn test_cli_build_with_unusable_index_section_fails() {
    let workspace = DocsDirBuilder::new()
        .with_index_section("Index\nsee also\nno pages here\n")
        .with_manual("page one");

    amber_agent(&workspace)
        .arg("build")
        .arg("--index-section")
        .arg(workspace.index_section_path())
        .arg("--manual")
        .arg(workspace.manual_path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no valid entries"));
    assert!(!workspace.docs_dir().join("index.json").exists());
}

#[test]
fn test_cli_search_lists_candidates() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();

    amber_agent(&workspace)
        .args(["search", "calculate", "distance", "between", "atoms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distance"))
        .stdout(predicate::str::contains("4-6"));
}

#[test]
fn test_cli_search_rejects_zero_limit() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();

    amber_agent(&workspace)
        .args(["search", "--limit", "0", "distance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--limit"));

    amber_agent(&workspace)
        .args(["search", "--limit", "1", "distance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distance"));
}

#[test]
fn test_cli_no_confident_match_exits_with_two() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();

    amber_agent(&workspace)
        .args(["generate", "xyzzyfoobar unrelated nonsense"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no confident command match"))
        .stderr(predicate::str::contains("--min-score"));
}

#[test]
fn test_cli_generate_served_from_cache_without_api_key() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();
    seed_cache(&workspace.cache_dir(), "rms", "rms", "rms first @CA out rmsd.dat");

    amber_agent(&workspace)
        .args(["generate", "rms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rms first @CA out rmsd.dat"));
}

#[test]
fn test_cli_generate_without_api_key_is_configuration_error() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();

    amber_agent(&workspace)
        .args(["generate", "--no-cache", "rms"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_cli_generate_without_index_fails() {
    let workspace = DocsDirBuilder::new();

    amber_agent(&workspace)
        .args(["generate", "rms"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("amber-agent build"));
}

#[test]
fn test_cli_invalid_temperature_is_rejected() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();

    amber_agent(&workspace)
        .args(["generate", "--temperature", "3.5", "rms"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn test_cli_config_file_is_applied() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();
    fs::write(workspace.root().join("amber-agent.toml"), "min_score = 100\n").unwrap();

    // "distanc" would clear 70 but not 100
    amber_agent(&workspace).args(["search", "distanc"]).assert().code(2);
}

#[test]
fn test_cli_clear_cache() {
    let workspace = DocsDirBuilder::new().with_sample_inputs().built();
    seed_cache(&workspace.cache_dir(), "rms", "rms", "cached");
    seed_cache(&workspace.cache_dir(), "angle", "angle", "cached");

    amber_agent(&workspace)
        .arg("clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache cleared (2 responses removed)"));
    assert_eq!(FsResponseCache::new(workspace.cache_dir()).len().unwrap(), 0);
}

#[test]
fn test_cli_clear_cache_missing_dir() {
    let workspace = DocsDirBuilder::new();

    amber_agent(&workspace)
        .arg("clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache directory doesn't exist"));
}

#[test]
fn test_cli_stats_after_build() {
    let workspace = DocsDirBuilder::new().with_sample_inputs();

    amber_agent(&workspace)
        .arg("build")
        .arg("--index-section")
        .arg(workspace.index_section_path())
        .arg("--manual")
        .arg(workspace.manual_path())
        .assert()
        .success();

    amber_agent(&workspace)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed commands: 6"))
        .stdout(predicate::str::contains("Slice artifacts: 6"))
        .stdout(predicate::str::contains("Status: up to date"));
}

#[test]
fn test_cli_help_flag() {
    let workspace = DocsDirBuilder::new();
    amber_agent(&workspace)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("AMBER/cpptraj"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("clear-cache"));
}

#[test]
fn test_cli_invalid_command() {
    let workspace = DocsDirBuilder::new();
    amber_agent(&workspace).arg("invalid-command").assert().failure();
}
