use async_trait::async_trait;
use seeker_common::{Result, SeekerError};
use seeker_pipeline::AnswerStream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Malformed stream event: {0}")]
    Decode(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    /// The body ended without the provider's end-of-answer marker.
    #[error("Stream ended before completion after {0} bytes")]
    Truncated(usize),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<LlmError> for SeekerError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Config(msg) => SeekerError::Config(msg),
            other => SeekerError::Generation(other.to_string()),
        }
    }
}

/// Cumulative snapshots: every item is the whole text generated so far.
pub type SnapshotStream = AnswerStream;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a complete response to the given prompt.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Generate a response as cumulative snapshots.
    ///
    /// Providers without incremental output yield the finished text once.
    async fn generate_stream(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<SnapshotStream> {
        let response = self
            .generate(prompt, system_prompt, max_tokens, temperature)
            .await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok(response.text)
        })))
    }

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

/// Map a non-success HTTP status to an [`LlmError`], keeping the body for
/// diagnostics.
pub(crate) async fn check_status(resp: reqwest::Response) -> std::result::Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimit);
    }
    let body = resp.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(512).collect();
    Err(LlmError::Api(format!("HTTP {status}: {snippet}")))
}
