//! # Search Error Types Module
//!
//! Error types for the web search stage of the catalog pipeline.

use thiserror::Error;

use crate::error::Error as CrateError;

/// Errors that can occur while querying the search provider
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },

    /// Missing or rejected API key
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The response body could not be decoded
    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}

impl From<SearchError> for CrateError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Http(e) => CrateError::Http(e),
            SearchError::Auth(msg) => CrateError::Auth(msg),
            _ => CrateError::Search(err.to_string()),
        }
    }
}
