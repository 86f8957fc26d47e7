use std::path::PathBuf;

use anyhow::{Context, Result};

const APP_DIR_NAME: &str = "amber-agent";
const RESPONSES_DIR_NAME: &str = "responses";

/// Default location of the response cache
///
/// - macOS: `~/Library/Caches/amber-agent/responses`
/// - Linux: `$XDG_CACHE_HOME/amber-agent/responses` or `~/.cache/amber-agent/responses`
/// - Windows: `%LOCALAPPDATA%\amber-agent\responses`
pub fn default_cache_dir() -> Result<PathBuf> {
    let cache_base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    Ok(cache_base.join(APP_DIR_NAME).join(RESPONSES_DIR_NAME))
}

/// Default docs directory holding the index and slice artifacts, relative to the working directory
pub fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}
