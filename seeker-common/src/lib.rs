//! Common types and utilities shared across Seeker crates.
//!
//! This crate defines the per-run request value, the browser identity enums,
//! observability helpers, and the shared error taxonomy used throughout the
//! Seeker workspace. It is intentionally lightweight so that every crate can
//! depend on it without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`RunRequest`]: Immutable per-run configuration threaded into the pipeline
//! - [`BrowserName`], [`ScriptMode`] and [`StealthLevel`]: Browser context identity
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`SeekerError`], [`ValidationError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use seeker_common::{BrowserName, RunRequest};
//!
//! let req = RunRequest::new("why is the sky blue?", BrowserName::Firefox, "/tmp/ws/browser_session");
//! assert_eq!(req.no_script_session_dir().to_str(), Some("/tmp/ws/browser_session_no_js"));
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod observability;

/// Browsers a context may be launched with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserName {
    #[default]
    Chrome,
    Firefox,
    Edge,
}

impl BrowserName {
    /// Every accepted browser, in the order shown to users.
    pub const ALL: [BrowserName; 3] = [BrowserName::Chrome, BrowserName::Firefox, BrowserName::Edge];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserName::Chrome => "chrome",
            BrowserName::Firefox => "firefox",
            BrowserName::Edge => "edge",
        }
    }

    /// Comma-separated list of valid names, e.g. for diagnostics.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|b| b.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for BrowserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserName {
    type Err = ValidationError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == lowered)
            .ok_or(ValidationError::InvalidBrowser(lowered))
    }
}

/// How aggressively browser contexts mask automation signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StealthLevel {
    Lightweight,
    #[default]
    Balanced,
    Maximum,
}

/// Whether a browser context executes page scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptMode {
    Enabled,
    Disabled,
}

impl ScriptMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ScriptMode::Enabled)
    }
}

/// Everything one pipeline run needs to know about its caller.
///
/// Captured once at process start and passed by reference into the
/// orchestrator, so the pipeline never reads ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    question: String,
    browser: BrowserName,
    session_dir: PathBuf,
}

impl RunRequest {
    pub fn new(
        question: impl Into<String>,
        browser: BrowserName,
        session_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            question: question.into(),
            browser,
            session_dir: session_dir.into(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn browser(&self) -> BrowserName {
        self.browser
    }

    /// Session directory for the script-enabled context.
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Session directory for the script-disabled context: the scriptable
    /// directory with `_no_js` appended.
    pub fn no_script_session_dir(&self) -> PathBuf {
        let mut raw = self.session_dir.clone().into_os_string();
        raw.push("_no_js");
        PathBuf::from(raw)
    }
}

/// Problems with the caller's input. Always reported before any pipeline
/// work starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no input provided")]
    MissingInput,

    #[error("invalid input: {0}")]
    MalformedInput(String),

    #[error("no question provided")]
    MissingQuestion,

    #[error("GPTScript workspace ID and directory are not set")]
    MissingWorkspace,

    #[error("invalid browser name {0}")]
    InvalidBrowser(String),
}

/// Error types used across the Seeker system.
#[derive(thiserror::Error, Debug)]
pub enum SeekerError {
    /// The caller's input was incomplete or invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A browser context could not be launched or bound to its session.
    #[error("Browser context error: {0}")]
    Context(String),

    /// The searcher failed to produce page contents.
    #[error("Search error: {0}")]
    Search(String),

    /// The language model failed to derive a query or produce an answer.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Settings were incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Streaming the answer to the caller failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// The run was cancelled before it completed.
    #[error("Run cancelled")]
    Cancelled,
}

/// Convenient alias for results that use [`SeekerError`].
pub type Result<T> = std::result::Result<T, SeekerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_names_parse_case_insensitively() {
        assert_eq!("Chrome".parse::<BrowserName>(), Ok(BrowserName::Chrome));
        assert_eq!(" FIREFOX ".parse::<BrowserName>(), Ok(BrowserName::Firefox));
        assert_eq!("edge".parse::<BrowserName>(), Ok(BrowserName::Edge));
    }

    #[test]
    fn unknown_browser_is_a_validation_error() {
        let err = "Safari".parse::<BrowserName>().unwrap_err();
        assert_eq!(err, ValidationError::InvalidBrowser("safari".to_string()));
        assert_eq!(err.to_string(), "invalid browser name safari");
    }

    #[test]
    fn valid_names_are_listed_in_display_order() {
        assert_eq!(BrowserName::valid_names(), "chrome, firefox, edge");
        assert_eq!(BrowserName::default(), BrowserName::Chrome);
    }

    #[test]
    fn no_script_dir_appends_suffix_to_last_component() {
        let req = RunRequest::new("q", BrowserName::Chrome, "/work/space/browser_session");
        assert_eq!(req.session_dir(), Path::new("/work/space/browser_session"));
        assert_eq!(
            req.no_script_session_dir(),
            PathBuf::from("/work/space/browser_session_no_js")
        );
    }
}
