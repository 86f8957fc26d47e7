use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Fingerprint;

/// A previously generated result keyed by its request fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub key: Fingerprint,
    pub value: String,
    pub created_at: DateTime<Utc>,
    /// Matched command key, informational
    #[serde(default)]
    pub command: String,
    /// Model identifier, informational
    #[serde(default)]
    pub model: String,
}

impl CacheRecord {
    pub fn new(key: Fingerprint, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
            created_at: Utc::now(),
            command: String::new(),
            model: String::new(),
        }
    }

    pub fn with_request(mut self, command: &str, model: &str) -> Self {
        self.command = command.to_string();
        self.model = model.to_string();
        self
    }
}
