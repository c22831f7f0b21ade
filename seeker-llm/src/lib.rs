//! Language model integration for Seeker.
//!
//! [`traits::LlmClient`] is the provider seam; [`openai::OpenAiClient`] and
//! [`ollama::OllamaClient`] stream cumulative snapshots over HTTP. The
//! pipeline's query and answer collaborators are built on top of it in
//! [`query`] and [`answer`].
//!
//! # Examples
//! ```no_run
//! use seeker_config::LlmSettings;
//! use seeker_llm::build_llm_client;
//!
//! # #[tokio::main]
//! # async fn main() -> seeker_common::Result<()> {
//! let client = build_llm_client(&LlmSettings::default()).await?;
//! assert_eq!(client.model_name(), "gpt-4o");
//! # Ok(())
//! # }
//! ```
pub mod answer;
pub mod lines;
pub mod ollama;
pub mod openai;
pub mod query;
pub mod traits;

pub use answer::LlmAnswerGenerator;
pub use query::LlmQueryDeriver;

use ollama::OllamaClient;
use openai::OpenAiClient;
use seeker_common::Result;
use seeker_config::LlmSettings;
use std::sync::Arc;
use traits::LlmClient;

/// Build the configured client. Ollama is probed (and the model pulled)
/// before this returns.
pub async fn build_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>> {
    match settings {
        LlmSettings::Openai {
            model,
            auth_token,
            endpoint,
            ..
        } => {
            let client = OpenAiClient::new(auth_token.clone(), model.clone(), endpoint.clone())?;
            Ok(Arc::new(client))
        }
        LlmSettings::Ollama {
            model, endpoint, ..
        } => {
            let client = OllamaClient::new(endpoint.clone(), model.clone()).await?;
            Ok(Arc::new(client))
        }
    }
}
