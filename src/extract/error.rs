//! Error types for the extraction module

use rig::completion::CompletionError;
use thiserror::Error;

use crate::crawler::CrawlError;
use crate::error::Error as CrateError;
use crate::search::SearchError;

/// Errors raised while turning supplier pages into structured listings
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The completion request failed
    #[error("LLM error: {0}")]
    Llm(#[from] CompletionError),

    /// The model answered with something that is not the expected JSON
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    /// Searching for supplier pages failed
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Fetching a supplier page failed
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// The agent ended the conversation without an answer
    #[error("Agent error: {0}")]
    Agent(String),

    /// The agent kept calling tools past the iteration limit
    #[error("Agent reached maximum iterations ({0})")]
    MaxIterations(usize),
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Parse(err.to_string())
    }
}

impl From<ExtractError> for CrateError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Search(e) => e.into(),
            ExtractError::Crawl(e) => e.into(),
            _ => CrateError::Extract(err.to_string()),
        }
    }
}
