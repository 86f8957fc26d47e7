//! Request fingerprints.
//!
//! A fingerprint is the SHA-256 of a canonical JSON document describing everything that
//! influences a generated answer. Two requests that would produce the same prompt for the
//! same model share a fingerprint; changing any of those inputs changes it.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Bumped whenever the fingerprinted fields or their encoding change
pub const FINGERPRINT_SCHEMA: u32 = 1;

/// Hex-encoded SHA-256 cache key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accepts only 64 lowercase hex digits, so a fingerprint is always a safe file stem
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == 64 && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| Self(raw.to_string()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The inputs that determine a generated answer
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintInput<'a> {
    pub program: &'a str,
    /// Storage key of the matched command
    pub command: &'a str,
    pub query: &'a str,
    pub model: &'a str,
    pub temperature: f32,
    pub max_chars: usize,
}

#[derive(Serialize)]
struct Canonical<'a> {
    schema: u32,
    program: String,
    command: &'a str,
    query: String,
    model: &'a str,
    temperature: String,
    max_chars: usize,
}

impl FingerprintInput<'_> {
    pub fn fingerprint(&self) -> Fingerprint {
        let canonical = Canonical {
            schema: FINGERPRINT_SCHEMA,
            program: self.program.trim().to_lowercase(),
            command: self.command,
            query: normalize_query(self.query),
            model: self.model.trim(),
            // Formatted so 0.2 and 0.20000001 hash alike
            temperature: format!("{:.3}", self.temperature),
            max_chars: self.max_chars,
        };
        // Serializing a struct of strings and integers cannot fail
        let json = serde_json::to_string(&canonical).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Fingerprint(hex::encode(hasher.finalize()))
    }
}

/// Trim, collapse internal whitespace, lowercase
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
