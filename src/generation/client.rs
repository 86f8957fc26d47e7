//! Client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerationError;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One generation call: a fixed system prompt plus the assembled user prompt
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub temperature: f32,
    pub system: String,
    pub user: String,
}

/// The external text generation service
pub trait Generator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// `POST {base_url}/chat/completions` over a blocking HTTP client
#[derive(Debug, Clone)]
pub struct ChatCompletionsGenerator {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl ChatCompletionsGenerator {
    /// The API key is checked when a request is made, not here, so cached answers work
    /// without credentials.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Connection(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn headers(&self) -> Result<HeaderMap, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::MissingApiKey(API_KEY_ENV.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            GenerationError::MissingApiKey(format!("{} (contains invalid characters)", API_KEY_ENV))
        })?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}

impl Generator for ChatCompletionsGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let headers = self.headers()?;
        let body = ChatRequest {
            model: &request.model,
            temperature: request.temperature,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
        };

        debug!(url = %self.endpoint(), model = %request.model, "sending chat completion request");
        let response = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&body)
            .send()
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(classify_status(response));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("response contained no message content".to_string()))
    }
}

fn classify_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Connection(err.to_string())
    }
}

fn classify_status(response: Response) -> GenerationError {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        return GenerationError::RateLimited { retry_after_secs };
    }

    let message = response
        .json::<ErrorResponse>()
        .map(|body| body.error.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
    GenerationError::Api { status: status.as_u16(), message }
}
