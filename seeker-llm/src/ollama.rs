use crate::lines::LineBuffer;
use crate::traits::{check_status, LlmClient, LlmError, LlmResponse, SnapshotStream};
use async_trait::async_trait;
use futures::StreamExt;
use seeker_common::{Result, SeekerError};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

/// Shown when nothing answers at the configured endpoint.
const SERVER_UNREACHABLE: &str =
    "ollama is not reachable; start it with `ollama serve` or point llm.endpoint elsewhere";

/// Streams completions from a local Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct Tags {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// One NDJSON line of `/api/generate`.
#[derive(Debug, Deserialize)]
struct GenerateLine {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    error: Option<String>,
    eval_count: Option<u32>,
}

fn parse_line(line: &str) -> std::result::Result<Option<GenerateLine>, LlmError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let parsed: GenerateLine =
        serde_json::from_str(line).map_err(|e| LlmError::Decode(e.to_string()))?;
    if let Some(err) = parsed.error {
        return Err(LlmError::Api(err));
    }
    Ok(Some(parsed))
}

impl OllamaClient {
    /// Connect to `base_url`, pulling `model` first if the server lacks it.
    pub async fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(LlmError::from)?;
        let this = Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        };

        let installed = this.installed_models().await?;
        if !installed.iter().any(|m| m == &this.model) {
            tracing::info!(target: "llm.stream", model = %this.model, "model missing locally, pulling");
            this.pull().await?;
        }
        Ok(this)
    }

    /// Names from `/api/tags`. Any transport failure means the server is down.
    async fn installed_models(&self) -> Result<Vec<String>> {
        let unreachable = || SeekerError::Generation(SERVER_UNREACHABLE.to_string());
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|_| unreachable())?;
        if !resp.status().is_success() {
            return Err(unreachable());
        }
        let tags: Tags = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(format!("model list: {e}")))?;
        Ok(tags.models.into_iter().map(|t| t.name).collect())
    }

    async fn pull(&self) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&json!({ "model": self.model, "stream": false }))
            .send()
            .await
            .map_err(LlmError::from)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let reason = format!("{} (pull returned {status})", self.model);
            return Err(LlmError::ModelNotAvailable(reason).into());
        }
        tracing::info!(target: "llm.stream", model = %self.model, "model pulled");
        Ok(())
    }

    fn payload(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        stream: bool,
    ) -> JsonValue {
        let mut options = serde_json::Map::new();
        if let Some(t) = temperature {
            options.insert("temperature".into(), json!(t));
        }
        if let Some(n) = max_tokens {
            options.insert("num_predict".into(), json!(n));
        }

        let mut payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": stream,
            "options": options
        });
        if let Some(system) = system_prompt {
            payload["system"] = json!(system);
        }
        payload
    }

    async fn post_generate(&self, payload: &JsonValue) -> Result<reqwest::Response> {
        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(LlmError::from)?;
        Ok(check_status(resp).await?)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let payload = self.payload(prompt, system_prompt, max_tokens, temperature, false);
        let body = self
            .post_generate(&payload)
            .await?
            .text()
            .await
            .map_err(LlmError::from)?;

        let line = parse_line(&body)?
            .ok_or_else(|| SeekerError::Generation("empty response from Ollama".into()))?;

        Ok(LlmResponse {
            text: line.response,
            model: Some(self.model.clone()),
            tokens_used: line.eval_count,
        })
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<SnapshotStream> {
        let payload = self.payload(prompt, system_prompt, max_tokens, temperature, true);
        let resp = self.post_generate(&payload).await?;
        tracing::debug!(target: "llm.stream", model = %self.model, "ollama stream opened");

        let mut bytes = Box::pin(resp.bytes_stream());
        Ok(Box::pin(async_stream::try_stream! {
            let mut lines = LineBuffer::new();
            let mut text = String::new();
            let mut done = false;
            while !done {
                let Some(chunk) = bytes.next().await else { break };
                let chunk = chunk.map_err(|e| SeekerError::from(LlmError::from(e)))?;
                for line in lines.push(&chunk) {
                    let Some(parsed) = parse_line(&line).map_err(SeekerError::from)? else { continue };
                    if !parsed.response.is_empty() {
                        text.push_str(&parsed.response);
                        yield text.clone();
                    }
                    if parsed.done {
                        done = true;
                        break;
                    }
                }
            }
            if !done {
                if let Some(tail) = lines.finish() {
                    if let Some(parsed) = parse_line(&tail).map_err(SeekerError::from)? {
                        if !parsed.response.is_empty() {
                            text.push_str(&parsed.response);
                            yield text.clone();
                        }
                        done = parsed.done;
                    }
                }
            }
            if !done {
                tracing::warn!(target: "llm.stream", bytes = text.len(), "ollama stream cut off before done");
                Err::<(), SeekerError>(LlmError::Truncated(text.len()).into())?;
            }
            tracing::debug!(target: "llm.stream", bytes = text.len(), "ollama stream closed");
        }))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.installed_models().await.is_ok())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
