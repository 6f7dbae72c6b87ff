//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for page fetching
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The page did not load within the configured timeout
    #[error("Timed out fetching {0}")]
    Timeout(String),

    /// The fetch finished without producing a page
    #[error("No content returned for {0}")]
    EmptyPage(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::UrlParse(e) => CrateError::Other(format!("URL parse error: {}", e)),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
