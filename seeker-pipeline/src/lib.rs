//! The question-to-answer pipeline.
//!
//! Collaborators are reached only through the traits in [`traits`], so the
//! orchestration here is independent of which browser driver or language
//! model sits behind them.
//!
//! - [`Pipeline`]: setup join, search, prompt, streamed answer
//! - [`IncrementalFilter`]: turns cumulative snapshots into append-only output
//! - [`compose_prompt`]: the fixed answer instructions plus question and pages
pub mod filter;
pub mod orchestrator;
pub mod prompt;
pub mod traits;

pub use filter::IncrementalFilter;
pub use orchestrator::{Pipeline, RunOutcome};
pub use prompt::{compose_prompt, ANSWER_INSTRUCTIONS};
pub use traits::{
    AnswerGenerator, AnswerStream, BrowserSession, ContextProvider, QueryDeriver, Searcher,
};
