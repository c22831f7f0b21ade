use crate::lines::LineBuffer;
use crate::traits::{check_status, LlmClient, LlmError, LlmResponse, SnapshotStream};
use async_trait::async_trait;
use futures::StreamExt;
use seeker_common::{Result, SeekerError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client for the OpenAI chat completions API or any compatible gateway.
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u32>,
}

/// One `data:` payload of a streamed completion.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Delta(String),
    Done,
    Skip,
}

/// Decode one server-sent-events line.
fn parse_sse_line(line: &str) -> std::result::Result<SseEvent, LlmError> {
    let Some(payload) = line.strip_prefix("data:") else {
        // Blank separators, comments and `event:`/`id:` fields carry no text.
        return Ok(SseEvent::Skip);
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return Ok(SseEvent::Done);
    }
    if payload.is_empty() {
        return Ok(SseEvent::Skip);
    }
    let chunk: ChatChunk =
        serde_json::from_str(payload).map_err(|e| LlmError::Decode(e.to_string()))?;
    if let Some(err) = chunk.error {
        return Err(LlmError::Api(err.message));
    }
    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .unwrap_or_default();
    Ok(SseEvent::Delta(text))
}

impl OpenAiClient {
    /// Create a client. `endpoint` is the API base, e.g.
    /// [`OPENAI_API_BASE`]; a trailing slash is ignored.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config(
                "OpenAI auth token is empty; set llm.auth_token or OPENAI_API_KEY".into(),
            )
            .into());
        }
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SeekerError::Generation(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    fn request<'a>(
        &'a self,
        prompt: &'a str,
        system_prompt: Option<&'a str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        stream: bool,
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
            stream,
        }
    }

    async fn post(&self, body: &ChatRequest<'_>) -> std::result::Result<reqwest::Response, LlmError> {
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        check_status(resp).await
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let body = self.request(prompt, system_prompt, max_tokens, temperature, false);
        let resp: ChatResponse = self
            .post(&body)
            .await?
            .json()
            .await
            .map_err(LlmError::from)?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<SnapshotStream> {
        let body = self.request(prompt, system_prompt, max_tokens, temperature, true);
        let resp = self.post(&body).await?;
        tracing::debug!(target: "llm.stream", model = %self.model, "openai stream opened");

        let mut bytes = Box::pin(resp.bytes_stream());
        Ok(Box::pin(async_stream::try_stream! {
            let mut lines = LineBuffer::new();
            let mut text = String::new();
            let mut done = false;
            while !done {
                let Some(chunk) = bytes.next().await else { break };
                let chunk = chunk.map_err(|e| SeekerError::from(LlmError::from(e)))?;
                for line in lines.push(&chunk) {
                    match parse_sse_line(&line).map_err(SeekerError::from)? {
                        SseEvent::Delta(delta) if !delta.is_empty() => {
                            text.push_str(&delta);
                            yield text.clone();
                        }
                        SseEvent::Done => {
                            done = true;
                            break;
                        }
                        _ => {}
                    }
                }
            }
            if !done {
                // `[DONE]` may arrive without a trailing newline.
                done = match lines.finish() {
                    Some(tail) => parse_sse_line(&tail).map_err(SeekerError::from)? == SseEvent::Done,
                    None => false,
                };
            }
            if !done {
                tracing::warn!(target: "llm.stream", bytes = text.len(), "openai stream cut off before [DONE]");
                Err::<(), SeekerError>(LlmError::Truncated(text.len()).into())?;
            }
            tracing::debug!(target: "llm.stream", bytes = text.len(), "openai stream closed");
        }))
    }

    async fn health_check(&self) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/models", self.endpoint))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;
        match resp {
            Ok(r) if r.status().is_success() => Ok(true),
            Ok(r) => {
                tracing::warn!(status = %r.status(), "OpenAI health check failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI health check failed");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
