//! The external text generation service and how it is called.

pub mod client;
pub mod prompt;
pub mod retry;

pub use client::{
    API_KEY_ENV, ChatCompletionsGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT,
    GenerationRequest, Generator,
};
pub use prompt::{SYSTEM_PROMPT, TRUNCATION_MARKER, build_user_prompt};
pub use retry::{DEFAULT_MAX_RETRIES, RetryPolicy};
