//! Error types for the catalog crate

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for catalog operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Classification lookup or entry source error
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    /// Web search error
    #[error("Search error: {0}")]
    Search(String),

    /// Page fetch error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// LLM extraction or schema derivation error
    #[error("Extract error: {0}")]
    Extract(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
