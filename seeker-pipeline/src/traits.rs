use async_trait::async_trait;
use futures::Stream;
use seeker_common::{BrowserName, Result, ScriptMode};
use std::path::Path;
use std::pin::Pin;

/// Cumulative answer snapshots: each item is everything generated so far,
/// not a delta. The last item is the complete answer.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Turns a natural-language question into a web search query.
#[async_trait]
pub trait QueryDeriver: Send + Sync {
    async fn derive_query(&self, question: &str) -> Result<String>;
}

/// A live browser context bound to a persisted session.
#[async_trait]
pub trait BrowserSession: Send + Sync + 'static {
    /// End the session. Consumes the handle, so a context is released at
    /// most once.
    async fn release(self) -> Result<()>;
}

/// Launches browser contexts.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    type Context: BrowserSession;

    async fn acquire_context(
        &self,
        browser: BrowserName,
        session_dir: &Path,
        scripts: ScriptMode,
    ) -> Result<Self::Context>;
}

/// Runs a search through the two contexts and aggregates page text.
#[async_trait]
pub trait Searcher<C: BrowserSession>: Send + Sync {
    async fn search(
        &self,
        browser: BrowserName,
        context: &C,
        no_script_context: &C,
        query: &str,
    ) -> Result<String>;
}

/// Produces an answer for a composed prompt as a stream of snapshots.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn stream_answer(&self, prompt: &str) -> Result<AnswerStream>;
}
