//! Layered configuration.
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file (`--config FILE`, else `./amber-agent.toml` when present)
//! 3. environment variables and command-line flags, already merged by clap
//!
//! Every layer is a [`ConfigLayer`] of optional fields; [`ConfigLayer::finalize`] fills the
//! gaps with defaults and validates the result.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::DEFAULT_MAX_CHARS;
use crate::error::AgentError;
use crate::generation::{DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::matcher::{DEFAULT_MIN_SCORE, Scorer};
use crate::pipeline::{DEFAULT_PROGRAM, DEFAULT_TEMPERATURE, GenerateOptions};
use crate::utils::{default_cache_dir, default_docs_dir};

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "amber-agent.toml";

const MAX_TEMPERATURE: f32 = 2.0;

/// One configuration layer. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub program: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub min_score: Option<u8>,
    pub max_chars: Option<usize>,
    pub max_retries: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
    pub scorer: Option<Scorer>,
    pub docs_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    /// Only read from the environment; never from a config file
    #[serde(skip)]
    pub api_key: Option<String>,
}

macro_rules! merge_fields {
    ($self:ident, $other:ident, $($field:ident),+ $(,)?) => {
        $(
            if $other.$field.is_some() {
                $self.$field = $other.$field;
            }
        )+
    };
}

impl ConfigLayer {
    /// Parse a TOML layer
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, AgentError> {
        toml::from_str(text)
            .map_err(|e| AgentError::config(format!("invalid config file {}: {}", origin.display(), e)))
    }

    /// Load the TOML layer. An explicit path must exist; the implicit default may be absent.
    pub fn load_file(explicit: Option<&Path>) -> Result<Self, AgentError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(AgentError::config(format!("config file {} not found", path.display())));
            }
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading config file");
        let text = fs::read_to_string(&path).map_err(|e| AgentError::io(&path, e))?;
        Self::from_toml(&text, &path)
    }

    /// Values set in `other` override values in `self`
    pub fn merge(&mut self, other: Self) {
        merge_fields!(
            self, other, program, model, temperature, min_score, max_chars, max_retries,
            timeout_secs, base_url, scorer, docs_dir, cache_dir, api_key,
        );
    }

    pub fn finalize(self) -> Result<Settings, AgentError> {
        let cache_dir = match self.cache_dir {
            Some(dir) => dir,
            None => default_cache_dir().map_err(|e| AgentError::config(e.to_string()))?,
        };

        let settings = Settings {
            program: self.program.unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            min_score: self.min_score.unwrap_or(DEFAULT_MIN_SCORE),
            max_chars: self.max_chars.unwrap_or(DEFAULT_MAX_CHARS),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            timeout: self.timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            scorer: self.scorer.unwrap_or_default(),
            docs_dir: self.docs_dir.unwrap_or_else(default_docs_dir),
            cache_dir,
            api_key: self.api_key,
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub program: String,
    pub model: String,
    pub temperature: f32,
    pub min_score: u8,
    pub max_chars: usize,
    pub max_retries: u32,
    pub timeout: Duration,
    pub base_url: String,
    pub scorer: Scorer,
    pub docs_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub api_key: Option<String>,
}

impl Settings {
    fn validate(&self) -> Result<(), AgentError> {
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(AgentError::config(format!(
                "temperature must be between 0 and {} (got {})",
                MAX_TEMPERATURE, self.temperature
            )));
        }
        if self.min_score > 100 {
            return Err(AgentError::config(format!(
                "min-score must be between 0 and 100 (got {})",
                self.min_score
            )));
        }
        if self.max_chars == 0 {
            return Err(AgentError::config("max-chars must be greater than 0"));
        }
        if self.program.trim().is_empty() {
            return Err(AgentError::config("program must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(AgentError::config("model must not be empty"));
        }
        Ok(())
    }

    pub fn generate_options(&self, use_cache: bool) -> GenerateOptions {
        GenerateOptions {
            program: self.program.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            min_score: self.min_score,
            max_chars: self.max_chars,
            use_cache,
        }
    }
}
