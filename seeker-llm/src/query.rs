//! Query derivation backed by a language model.
use crate::traits::LlmClient;
use async_trait::async_trait;
use regex::Regex;
use seeker_common::{Result, SeekerError};
use seeker_pipeline::QueryDeriver;
use std::sync::{Arc, OnceLock};

/// Longest query handed to the search engine, in bytes.
pub const MAX_QUERY_BYTES: usize = 2048;

const QUERY_SYSTEM_PROMPT: &str = r#"You turn questions into web search queries.
Reply with exactly one search query that would find pages answering the question.
Use the important keywords only. Do not answer the question, do not explain, do not use quotes or markdown."#;

pub struct LlmQueryDeriver {
    client: Arc<dyn LlmClient>,
}

impl LlmQueryDeriver {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryDeriver for LlmQueryDeriver {
    async fn derive_query(&self, question: &str) -> Result<String> {
        let prompt = format!("question: {question}\n\nsearch query:");
        let response = self
            .client
            .generate(&prompt, Some(QUERY_SYSTEM_PROMPT), Some(64), Some(0.0))
            .await?;
        tracing::debug!(target: "llm.query", raw = %response.text, "model suggested a query");

        sanitize_search_query(&response.text).ok_or_else(|| {
            SeekerError::Generation(format!(
                "model returned no usable search query: {:?}",
                response.text
            ))
        })
    }
}

fn strip_label(line: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"(?i)^\s*(search\s+)?query\s*:\s*").ok()) {
        Some(re) => re.replace(line, ""),
        None => line.into(),
    }
}

/// Reduce model output to a single plain query line.
///
/// ```
/// use seeker_llm::query::sanitize_search_query;
///
/// assert_eq!(
///     sanitize_search_query("```\nQuery: \"rust  borrow checker\"\n```").as_deref(),
///     Some("rust borrow checker")
/// );
/// assert_eq!(sanitize_search_query("  \n``` ```"), None);
/// ```
pub fn sanitize_search_query(raw: &str) -> Option<String> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("```"))?;
    let line = strip_label(line);
    let line = line.trim().trim_matches(|c| matches!(c, '"' | '\'' | '`')).trim();

    let mut out = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if out.is_empty() {
        return None;
    }
    if out.len() > MAX_QUERY_BYTES {
        let cut = out
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_QUERY_BYTES)
            .last()
            .unwrap_or(0);
        out.truncate(cut);
    }
    Some(out)
}
