//! # Supplier Page Fetching Module
//!
//! This module fetches supplier pages found by the search stage and reduces
//! them to plain text the language model can read.
//!
//! ## Key Components
//!
//! - `FetchConfig`: Timeouts, user agent and boilerplate selectors
//! - `PageFetcher`: The fetch capability the extractors depend on
//! - `SpiderFetcher`: Implementation backed by spider (headless Chrome with the `chrome` feature)
//! - `extract_text`: HTML to whitespace-normalised visible text
//!
//! ## Usage
//!
//! The direct pipeline fetches every search hit and keeps the cleaned text;
//! the agent tool returns the first characters of the raw HTML instead.

mod config;
mod content_extraction;
mod error;
mod spider_integration;

use std::future::Future;

use serde::{Deserialize, Serialize};

pub use config::{FetchConfig, FetchConfigBuilder};
pub use content_extraction::{extract_text, truncate_chars};
pub use error::CrawlError;
pub use spider_integration::{fetch_page, SpiderFetcher};

/// A fetched page before text extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL of the page
    pub url: String,

    /// Raw (or rendered) HTML
    pub html: String,
}

/// Page fetch capability
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, CrawlError>> + Send;
}
