use std::borrow::Cow;
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::models::normalize_name;

/// Maximum size for the index section text: 10MB
pub const MAX_INDEX_SECTION_BYTES: u64 = 10 * 1024 * 1024;
/// Maximum size for the full reference document text: 256MB
pub const MAX_REFERENCE_BYTES: u64 = 256 * 1024 * 1024;

// Everything except ASCII alphanumerics, '-' and '_' is percent-encoded. '%' itself is
// encoded, which keeps the mapping injective, and '.' is encoded so no key can be "..".
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Derives the storage key for a command name.
///
/// The name is normalized first, so every casing of a command shares one key. Distinct
/// normalized names always produce distinct keys, and keys are safe file stems.
///
/// # Examples
///
/// ```
/// use amber_agent::utils::storage_key;
///
/// assert_eq!(storage_key("Distance"), "distance");
/// assert_eq!(storage_key("rms/fit"), "rms%2Ffit");
/// assert_eq!(storage_key("2d+rms"), "2d%2Brms");
/// ```
pub fn storage_key(name: &str) -> String {
    utf8_percent_encode(&normalize_name(name), KEY_ENCODE_SET).to_string()
}

/// Recovers the normalized command name from a storage key
///
/// # Examples
///
/// ```
/// use amber_agent::utils::{decode_storage_key, storage_key};
///
/// assert_eq!(decode_storage_key(&storage_key("a:b.c")), "a:b.c");
/// ```
pub fn decode_storage_key(key: &str) -> String {
    percent_decode_str(key).decode_utf8_lossy().into_owned()
}

/// Writes a file atomically (temp file + rename) so readers never observe a partial file
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let temp = path.with_file_name(format!("{}.tmp", file_name));
    fs::write(&temp, contents)?;
    fs::rename(&temp, path)
}

/// Validates that a file's size is within `max_bytes`
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// race conditions where the file could be modified between the size check
/// and subsequent file operations.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than `max_bytes`
pub fn validate_file_size(file: &File, path: &Path, max_bytes: u64) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > max_bytes {
        bail!("File too large: {} ({} bytes, max {} bytes)", path.display(), file_size, max_bytes);
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use amber_agent::utils::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/.cache/amber-agent");
/// // Returns "~/.cache/amber-agent" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

/// Joins a key and extension under `dir`
pub(crate) fn keyed_path(dir: &Path, key: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", key, extension))
}
