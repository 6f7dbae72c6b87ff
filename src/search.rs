//! # Web Search Module
//!
//! This module finds supplier pages for a product category. It is the entry
//! point of the per-category extraction: search results feed the page
//! fetcher, and the agentic strategy exposes the same search as a tool.
//!
//! ## Key Components
//!
//! - `WebSearch`: The search capability the extractors depend on
//! - `TavilyClient`: Implementation backed by the Tavily search API
//! - `SearchHit`: One search result (URL plus optional title and snippet)

mod error;
mod tavily;

use std::future::Future;

use serde::{Deserialize, Serialize};

pub use error::SearchError;
pub use tavily::TavilyClient;

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// URL of the result page
    pub url: String,

    /// Page title, when the provider returns one
    pub title: Option<String>,

    /// Snippet of page content
    pub content: Option<String>,
}

/// Web search capability
pub trait WebSearch: Send + Sync {
    /// Search for `query`, returning at most `max_results` hits
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<SearchHit>, SearchError>> + Send;
}

/// Query used to find supplier pages for a category
pub fn supplier_query(category: &str) -> String {
    format!("Buy {} online", category)
}
