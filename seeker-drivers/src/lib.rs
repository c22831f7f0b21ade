//! Driver layer for browser automation.
//!
//! Every run gets two WebDriver sessions bound to persisted profile
//! directories: one that executes page scripts and one that does not.
//!
//! - [`seeker_browser::provider::WebDriverContextProvider`]: launches contexts
//! - [`seeker_browser::context::BrowserContext`]: fetches pages, ends the session
//! - [`seeker_browser::capabilities`]: per-browser WebDriver capabilities
//! - [`seeker_browser::stealth`]: launch arguments and JS evasions
//! - [`seeker_browser::behavioral::BehavioralEngine`]: human-like timings
pub mod seeker_browser;

pub use seeker_browser::context::{BrowserContext, FetchedPage};
pub use seeker_browser::provider::WebDriverContextProvider;
