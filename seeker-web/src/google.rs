//! Google searcher over a script-enabled and a script-disabled context.
//!
//! The scriptable context is always tried first. The other one is used
//! when Google shows no organic results (consent walls, captchas) and when
//! a result page fails to load or renders too little text.
use crate::extract::{SearchResult, extract_page_text, extract_results};
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use seeker_common::{BrowserName, Result, ScriptMode, SeekerError};
use seeker_config::SearchSettings;
use seeker_drivers::{BrowserContext, FetchedPage};
use seeker_pipeline::{BrowserSession, Searcher};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// Anything that can load a URL and hand back its HTML.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> AnyResult<FetchedPage>;

    fn script_mode(&self) -> ScriptMode;
}

#[async_trait]
impl PageSource for BrowserContext {
    async fn fetch_page(&self, url: &str) -> AnyResult<FetchedPage> {
        self.fetch(url).await
    }

    fn script_mode(&self) -> ScriptMode {
        self.scripts()
    }
}

/// One page that made it into the search output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageBlock {
    url: String,
    title: String,
    text: String,
}

impl PageBlock {
    fn render(&self) -> String {
        format!("URL: {}\nTitle: {}\n{}", self.url, self.title, self.text)
    }
}

pub struct GoogleSearcher {
    settings: SearchSettings,
}

impl GoogleSearcher {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    /// ```
    /// use seeker_config::SearchSettings;
    /// use seeker_web::GoogleSearcher;
    ///
    /// let url = GoogleSearcher::new(SearchSettings::default()).search_url("rust & tokio").unwrap();
    /// assert_eq!(url.as_str(), "https://www.google.com/search?q=rust+%26+tokio&hl=en");
    /// ```
    pub fn search_url(&self, query: &str) -> Result<Url> {
        Url::parse_with_params(GOOGLE_SEARCH_URL, &[("q", query), ("hl", "en")])
            .map_err(|e| SeekerError::Search(format!("invalid search URL: {e}")))
    }

    async fn find_results<C: PageSource>(
        &self,
        context: &C,
        no_script: &C,
        search_url: &Url,
    ) -> Vec<SearchResult> {
        for source in [context, no_script] {
            match source.fetch_page(search_url.as_str()).await {
                Ok(page) => {
                    let base = Url::parse(&page.url).unwrap_or_else(|_| search_url.clone());
                    let results = extract_results(&page.html, &base);
                    info!(
                        target: "search.google",
                        scripts = ?source.script_mode(),
                        results = results.len(),
                        "results page parsed"
                    );
                    if !results.is_empty() {
                        return results;
                    }
                }
                Err(e) => warn!(
                    target: "search.google",
                    scripts = ?source.script_mode(),
                    error = %e,
                    "results page failed to load"
                ),
            }
        }
        Vec::new()
    }

    /// Read one result, falling back to the script-disabled context when
    /// the first attempt is unusable. Keeps the longer of the two texts.
    async fn read_page<C: PageSource>(
        &self,
        context: &C,
        no_script: &C,
        result: &SearchResult,
    ) -> Option<PageBlock> {
        let mut best: Option<PageBlock> = None;
        for source in [context, no_script] {
            match source.fetch_page(result.url.as_str()).await {
                Ok(page) => {
                    let extracted = extract_page_text(&page.html, self.settings.max_chars_per_page);
                    let candidate = PageBlock {
                        url: page.url,
                        title: extracted
                            .title
                            .or_else(|| Some(page.title).filter(|t| !t.trim().is_empty()))
                            .unwrap_or_else(|| result.title.clone()),
                        text: extracted.text,
                    };
                    let chars = candidate.text.chars().count();
                    debug!(
                        target: "search.google",
                        scripts = ?source.script_mode(),
                        url = %result.url,
                        chars,
                        "result page read"
                    );
                    if best.as_ref().is_none_or(|b| chars > b.text.chars().count()) {
                        best = Some(candidate);
                    }
                    if chars >= self.settings.min_content_chars {
                        break;
                    }
                }
                Err(e) => warn!(
                    target: "search.google",
                    scripts = ?source.script_mode(),
                    url = %result.url,
                    error = %e,
                    "result page failed to load"
                ),
            }
        }
        best.filter(|b| !b.text.is_empty())
    }

    async fn run<C: PageSource>(&self, context: &C, no_script: &C, query: &str) -> Result<String> {
        let search_url = self.search_url(query)?;
        let results = self.find_results(context, no_script, &search_url).await;
        if results.is_empty() {
            return Err(SeekerError::Search(format!("no search results for {query:?}")));
        }

        let mut seen = HashSet::new();
        let mut blocks = Vec::new();
        for result in results.iter().take(self.settings.max_pages) {
            let Some(block) = self.read_page(context, no_script, result).await else {
                continue;
            };
            if !seen.insert(blake3::hash(block.text.as_bytes())) {
                debug!(target: "search.google", url = %block.url, "duplicate page content skipped");
                continue;
            }
            blocks.push(block);
        }

        if blocks.is_empty() {
            return Err(SeekerError::Search(format!(
                "none of the {} results for {query:?} could be read",
                results.len().min(self.settings.max_pages)
            )));
        }
        info!(target: "search.google", pages = blocks.len(), "search finished");
        Ok(blocks
            .iter()
            .map(PageBlock::render)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

#[async_trait]
impl<C> Searcher<C> for GoogleSearcher
where
    C: PageSource + BrowserSession,
{
    async fn search(
        &self,
        browser: BrowserName,
        context: &C,
        no_script_context: &C,
        query: &str,
    ) -> Result<String> {
        info!(target: "search.google", browser = %browser, query, "searching");
        self.run(context, no_script_context, query).await
    }
}
