use anyhow::anyhow;
use async_trait::async_trait;
use seeker_common::{BrowserName, ScriptMode, SeekerError};
use seeker_config::SearchSettings;
use seeker_drivers::FetchedPage;
use seeker_pipeline::{BrowserSession, Searcher};
use seeker_web::{GoogleSearcher, PageSource};
use std::collections::HashMap;
use std::sync::Mutex;

const SEARCH: &str = "https://www.google.com/search?q=rust+borrowing&hl=en";

struct FakeSource {
    mode: ScriptMode,
    pages: HashMap<String, String>,
    visits: Mutex<Vec<String>>,
}

impl FakeSource {
    fn new(mode: ScriptMode, pages: &[(&str, String)]) -> Self {
        Self {
            mode,
            pages: pages
                .iter()
                .map(|(u, h)| (u.to_string(), h.clone()))
                .collect(),
            visits: Mutex::new(Vec::new()),
        }
    }

    fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_page(&self, url: &str) -> anyhow::Result<FetchedPage> {
        self.visits.lock().unwrap().push(url.to_string());
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED {url}"))?;
        Ok(FetchedPage {
            url: url.to_string(),
            title: String::new(),
            html: html.clone(),
        })
    }

    fn script_mode(&self) -> ScriptMode {
        self.mode
    }
}

#[async_trait]
impl BrowserSession for FakeSource {
    async fn release(self) -> seeker_common::Result<()> {
        Ok(())
    }
}

fn results_page(urls: &[&str]) -> String {
    let links: String = urls
        .iter()
        .enumerate()
        .map(|(i, u)| format!(r#"<div class="g"><a href="{u}"><h3>Result {i}</h3></a></div>"#))
        .collect();
    format!("<html><body><div id=\"search\">{links}</div></body></html>")
}

fn article(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body><nav>menu</nav><article><p>{body}</p></article></body></html>")
}

fn settings(max_pages: usize) -> SearchSettings {
    SearchSettings {
        max_pages,
        max_chars_per_page: 6000,
        min_content_chars: 40,
    }
}

const LONG_A: &str = "Borrowing lets code use a value through a reference without moving it.";
const LONG_B: &str = "Mutable references are exclusive, shared references may be many at once.";

#[tokio::test]
async fn pages_are_read_with_fallback_for_thin_content() {
    let scripted = FakeSource::new(
        ScriptMode::Enabled,
        &[
            (SEARCH, results_page(&["https://a.example/", "https://b.example/"])),
            ("https://a.example/", article("Page A", LONG_A)),
            ("https://b.example/", "<html><body><div id=\"app\">Loading</div></body></html>".into()),
        ],
    );
    let plain = FakeSource::new(
        ScriptMode::Disabled,
        &[("https://b.example/", article("Page B", LONG_B))],
    );

    let searcher = GoogleSearcher::new(settings(5));
    let out = searcher
        .search(BrowserName::Chrome, &scripted, &plain, "rust borrowing")
        .await
        .unwrap();

    assert_eq!(
        out,
        format!(
            "URL: https://a.example/\nTitle: Page A\n{LONG_A}\n\nURL: https://b.example/\nTitle: Page B\n{LONG_B}"
        )
    );
    assert_eq!(plain.visits(), vec!["https://b.example/"]);
}

#[tokio::test]
async fn consent_wall_falls_back_to_the_script_disabled_context() {
    let scripted = FakeSource::new(
        ScriptMode::Enabled,
        &[
            (SEARCH, "<form><button>Accept all</button></form>".into()),
            ("https://a.example/", article("Page A", LONG_A)),
        ],
    );
    let plain = FakeSource::new(
        ScriptMode::Disabled,
        &[(
            SEARCH,
            r#"<a href="/url?q=https://a.example/&amp;sa=U">Page A</a>"#.into(),
        )],
    );

    let out = GoogleSearcher::new(settings(5))
        .search(BrowserName::Firefox, &scripted, &plain, "rust borrowing")
        .await
        .unwrap();

    assert!(out.starts_with("URL: https://a.example/\nTitle: Page A\n"));
    assert_eq!(plain.visits(), vec![SEARCH]);
}

#[tokio::test]
async fn no_results_anywhere_is_a_search_error() {
    let scripted = FakeSource::new(ScriptMode::Enabled, &[(SEARCH, "<p>captcha</p>".into())]);
    let plain = FakeSource::new(ScriptMode::Disabled, &[]);

    let err = GoogleSearcher::new(settings(5))
        .search(BrowserName::Edge, &scripted, &plain, "rust borrowing")
        .await
        .unwrap_err();
    assert!(matches!(err, SeekerError::Search(ref m) if m.contains("no search results")));
}

#[tokio::test]
async fn duplicate_pages_and_page_limit() {
    let scripted = FakeSource::new(
        ScriptMode::Enabled,
        &[
            (
                SEARCH,
                results_page(&[
                    "https://a.example/",
                    "https://mirror.example/a",
                    "https://b.example/",
                    "https://c.example/",
                ]),
            ),
            ("https://a.example/", article("Page A", LONG_A)),
            ("https://mirror.example/a", article("Page A", LONG_A)),
            ("https://b.example/", article("Page B", LONG_B)),
            ("https://c.example/", article("Page C", LONG_B)),
        ],
    );
    let plain = FakeSource::new(ScriptMode::Disabled, &[]);

    let out = GoogleSearcher::new(settings(3))
        .search(BrowserName::Chrome, &scripted, &plain, "rust borrowing")
        .await
        .unwrap();

    assert_eq!(out.matches("URL: ").count(), 2);
    assert!(!out.contains("mirror.example"));
    assert!(!scripted.visits().contains(&"https://c.example/".to_string()));
}
