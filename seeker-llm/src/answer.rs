use crate::traits::LlmClient;
use async_trait::async_trait;
use seeker_common::Result;
use seeker_pipeline::{AnswerGenerator, AnswerStream};
use std::sync::Arc;

/// Streams answers for composed prompts. The prompt already carries its
/// instructions, so no system prompt is sent.
pub struct LlmAnswerGenerator {
    client: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmAnswerGenerator {
    pub fn new(client: Arc<dyn LlmClient>, temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            client,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn stream_answer(&self, prompt: &str) -> Result<AnswerStream> {
        tracing::info!(
            target: "llm.stream",
            model = self.client.model_name(),
            prompt_bytes = prompt.len(),
            "requesting answer"
        );
        self.client
            .generate_stream(prompt, None, self.max_tokens, Some(self.temperature))
            .await
    }
}
