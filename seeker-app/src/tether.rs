//! Wires the collaborators named in the settings into a pipeline.
use anyhow::{Context, Result};
use seeker_config::SeekerSettings;
use seeker_drivers::WebDriverContextProvider;
use seeker_llm::{LlmAnswerGenerator, LlmQueryDeriver, build_llm_client};
use seeker_pipeline::Pipeline;
use seeker_web::GoogleSearcher;

pub type SeekerPipeline =
    Pipeline<LlmQueryDeriver, WebDriverContextProvider, GoogleSearcher, LlmAnswerGenerator>;

pub async fn build_pipeline(settings: &SeekerSettings) -> Result<SeekerPipeline> {
    let client = build_llm_client(&settings.llm)
        .await
        .context("failed to initialise the language model client")?;
    tracing::debug!(model = client.model_name(), "language model client ready");

    let deriver = LlmQueryDeriver::new(client.clone());
    let generator = LlmAnswerGenerator::new(
        client,
        settings.llm.temperature(),
        settings.llm.max_tokens(),
    );
    let provider = WebDriverContextProvider::from_settings(&settings.browser);
    let searcher = GoogleSearcher::new(settings.search.clone());

    Ok(Pipeline::new(deriver, provider, searcher, generator))
}
