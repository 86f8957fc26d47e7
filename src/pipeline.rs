//! Query orchestration: match, then answer from the cache or from the generator.
//!
//! # Error Handling Strategy
//!
//! - **No confident match**: returned as [`AgentError::NoConfidentMatch`] with the best
//!   sub-threshold candidate for diagnostics.
//! - **Cache failures**: logged at warn level and ignored. A failed read is a miss and a
//!   failed write leaves the answer uncached.
//! - **Generation failures**: transient ones are retried by the [`RetryPolicy`]; whatever
//!   remains is returned. Nothing is cached for a failed request.
//!
//! Nothing here writes to the index or the slice store.

use tracing::{debug, info, warn};

use crate::cache::{Fingerprint, FingerprintInput, ResponseCache};
use crate::context::{ContextLoader, DEFAULT_MAX_CHARS};
use crate::error::AgentError;
use crate::generation::{
    DEFAULT_MODEL, GenerationRequest, Generator, RetryPolicy, SYSTEM_PROMPT, build_user_prompt,
};
use crate::matcher::{DEFAULT_MIN_SCORE, MatchOptions, Similarity, best_candidate, match_candidates};
use crate::models::{CacheRecord, DocumentIndex, MatchCandidate};
use crate::slices::SliceStore;

pub const DEFAULT_PROGRAM: &str = "cpptraj";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Per-query knobs
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub program: String,
    pub model: String,
    pub temperature: f32,
    pub min_score: u8,
    pub max_chars: usize,
    pub use_cache: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            min_score: DEFAULT_MIN_SCORE,
            max_chars: DEFAULT_MAX_CHARS,
            use_cache: true,
        }
    }
}

/// Result of one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    pub command: MatchCandidate,
    pub fingerprint: Fingerprint,
    /// Served from the cache without calling the generator
    pub cached: bool,
}

pub struct Orchestrator<'a> {
    index: &'a DocumentIndex,
    slices: &'a dyn SliceStore,
    similarity: &'a dyn Similarity,
    generator: &'a dyn Generator,
    cache: &'a mut dyn ResponseCache,
    retry: RetryPolicy,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        index: &'a DocumentIndex,
        slices: &'a dyn SliceStore,
        similarity: &'a dyn Similarity,
        generator: &'a dyn Generator,
        cache: &'a mut dyn ResponseCache,
    ) -> Self {
        Self { index, slices, similarity, generator, cache, retry: RetryPolicy::default() }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Best candidate at or above `min_score`
    ///
    /// # Errors
    ///
    /// [`AgentError::NoConfidentMatch`] when every candidate scores below `min_score`.
    pub fn resolve(&self, query: &str, min_score: u8) -> Result<MatchCandidate, AgentError> {
        let mut candidates =
            match_candidates(query, self.index.entries(), MatchOptions::best(min_score), self.similarity);
        if candidates.is_empty() {
            let best = best_candidate(query, self.index.entries(), self.similarity)
                .map(|candidate| (candidate.entry.name, candidate.score));
            return Err(AgentError::NoConfidentMatch { query: query.to_string(), best });
        }
        Ok(candidates.swap_remove(0))
    }

    pub fn run(&mut self, query: &str, options: &GenerateOptions) -> Result<Outcome, AgentError> {
        if query.trim().is_empty() {
            return Err(AgentError::config("query is empty"));
        }

        let command = self.resolve(query, options.min_score)?;
        let key = command.entry.key();
        info!(command = %command.entry.name, score = command.score, "matched command");

        let fingerprint = FingerprintInput {
            program: &options.program,
            command: &key,
            query,
            model: &options.model,
            temperature: options.temperature,
            max_chars: options.max_chars,
        }
        .fingerprint();

        if options.use_cache {
            match self.cache.get(&fingerprint) {
                Ok(Some(record)) => {
                    debug!(%fingerprint, "response cache hit");
                    return Ok(Outcome { text: record.value, command, fingerprint, cached: true });
                }
                Ok(None) => debug!(%fingerprint, "response cache miss"),
                Err(e) => warn!(error = %e, "response cache read failed, continuing without cache"),
            }
        }

        let context = ContextLoader::new(self.index, self.slices).load(&command.entry.name, options.max_chars)?;
        if context.truncated {
            info!(max_chars = options.max_chars, "context truncated");
        }

        let request = GenerationRequest {
            model: options.model.clone(),
            temperature: options.temperature,
            system: SYSTEM_PROMPT.to_string(),
            user: build_user_prompt(&options.program, query, &command.entry, &context),
        };
        let generator = self.generator;
        let text = self.retry.run(|| generator.generate(&request))?;

        if options.use_cache {
            let record = CacheRecord::new(fingerprint.clone(), text.clone()).with_request(&key, &options.model);
            if let Err(e) = self.cache.put(record) {
                warn!(error = %e, "failed to store response in cache");
            }
        }

        Ok(Outcome { text, command, fingerprint, cached: false })
    }
}
