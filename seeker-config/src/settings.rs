//! Strongly typed settings for the collaborators: model provider, browser
//! drivers, and search limits.
use seeker_common::observability::LogFormat;
use seeker_common::{BrowserName, StealthLevel};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeekerSettings {
    pub llm: LlmSettings,
    pub browser: BrowserSettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmSettings {
    Openai {
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default = "default_openai_token")]
        auth_token: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
    },
    Ollama {
        model: String,
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::Openai {
            model: default_openai_model(),
            auth_token: default_openai_token(),
            temperature: default_temperature(),
            max_tokens: None,
            endpoint: default_openai_endpoint(),
        }
    }
}

impl LlmSettings {
    pub fn temperature(&self) -> f32 {
        match self {
            Self::Openai { temperature, .. } | Self::Ollama { temperature, .. } => *temperature,
        }
    }

    pub fn max_tokens(&self) -> Option<u32> {
        match self {
            Self::Openai { max_tokens, .. } | Self::Ollama { max_tokens, .. } => *max_tokens,
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4o".into()
}
fn default_openai_token() -> String {
    std::env::var("OPENAI_API_KEY").unwrap_or_default()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}
fn default_temperature() -> f32 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub stealth: StealthLevel,
    pub page_load_timeout_secs: u64,
    pub webdriver: WebDriverEndpoints,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            stealth: StealthLevel::default(),
            page_load_timeout_secs: 20,
            webdriver: WebDriverEndpoints::default(),
        }
    }
}

impl BrowserSettings {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs.max(1))
    }
}

/// Where each browser's WebDriver service listens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebDriverEndpoints {
    pub chrome: String,
    pub firefox: String,
    pub edge: String,
}

impl Default for WebDriverEndpoints {
    fn default() -> Self {
        Self {
            chrome: "http://localhost:9515".into(),
            firefox: "http://localhost:4444".into(),
            edge: "http://localhost:9516".into(),
        }
    }
}

impl WebDriverEndpoints {
    pub fn for_browser(&self, browser: BrowserName) -> &str {
        match browser {
            BrowserName::Chrome => &self.chrome,
            BrowserName::Firefox => &self.firefox,
            BrowserName::Edge => &self.edge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Result pages visited per search.
    pub max_pages: usize,
    /// Extracted text kept per page.
    pub max_chars_per_page: usize,
    /// Below this much text the script-disabled context is tried.
    pub min_content_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_pages: 5,
            max_chars_per_page: 6000,
            min_content_chars: 200,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
}
