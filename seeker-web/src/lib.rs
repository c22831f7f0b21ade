//! Web search over browser contexts.
//!
//! - Google result-page scraping with a script-disabled fallback (`google`)
//! - Result link and readable-text extraction from raw HTML (`extract`)

pub mod extract;
pub mod google;

pub use google::{GoogleSearcher, PageSource};
