//! Error types shared by the retrieval pipeline.
//!
//! # Error Handling Strategy
//!
//! Errors are split by who has to react to them:
//!
//! - **Fatal for the invocation**: [`AgentError::Configuration`] (missing inputs, credentials or
//!   invalid options) and [`AgentError::MissingDocumentation`] (index and slices disagree).
//! - **Soft outcome**: [`AgentError::NoConfidentMatch`] is not a crash. The CLI maps it to a
//!   distinct exit status and prints guidance instead of a failure.
//! - **Retried, then surfaced**: [`GenerationError`] carries a transient/permanent
//!   classification used by [`crate::generation::RetryPolicy`].
//! - **Never surfaced**: [`CacheError`] is logged and the query proceeds without the cache.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status for hard failures (configuration, missing documentation, generation).
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when no indexed command clears the match threshold.
pub const EXIT_NO_MATCH: i32 = 2;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no confident command match for '{query}' ({})", describe_best(.best))]
    NoConfidentMatch { query: String, best: Option<(String, u8)> },

    #[error("missing documentation for '{name}': no slice artifact under {}", .location.display())]
    MissingDocumentation { name: String, location: PathBuf },

    #[error("generation service error: {0}")]
    Generation(GenerationError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn describe_best(best: &Option<(String, u8)>) -> String {
    match best {
        Some((name, score)) => format!("best='{}' score={}", name, score),
        None => "no candidates".to_string(),
    }
}

impl AgentError {
    pub fn config(message: impl Into<String>) -> Self {
        AgentError::Configuration(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AgentError::Io { path: path.into(), source }
    }

    /// Soft errors are expected outcomes rather than failures.
    pub fn is_soft(&self) -> bool {
        matches!(self, AgentError::NoConfidentMatch { .. })
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_soft() { EXIT_NO_MATCH } else { EXIT_FAILURE }
    }
}

impl From<GenerationError> for AgentError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingApiKey(var) => AgentError::Configuration(format!(
                "{} is not set (use a .env file or export it in your shell)",
                var
            )),
            other => AgentError::Generation(other),
        }
    }
}

/// Failures of the external generation service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{0} is not set")]
    MissingApiKey(String),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("rate limited (retry after {retry_after_secs:?} seconds)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Timeouts, connection drops, rate limits and server-side errors are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Timeout
            | GenerationError::Connection(_)
            | GenerationError::RateLimited { .. } => true,
            GenerationError::Api { status, .. } => *status >= 500,
            GenerationError::MissingApiKey(_) | GenerationError::InvalidResponse(_) => false,
        }
    }
}

/// Failures reading or writing the response cache. Always degraded, never fatal.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt cache record {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}
