//! Tools exposed to the catalog agent.
//!
//! Both tools run their work on a spawned task: rig requires tool futures to
//! be `Sync`, which the search and fetch futures are not.

use rig::{completion::ToolDefinition, tool::Tool};
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::crawler::{truncate_chars, CrawlError, PageFetcher};
use crate::search::{SearchError, SearchHit, WebSearch};

/// Search hits returned to the agent per call
const SEARCH_MAX_RESULTS: usize = 2;

/// Characters of raw HTML returned to the agent per page
const PAGE_HTML_CHARS: usize = 5000;

/// Error type for agent tools.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Web search failed: {0}")]
    WebSearch(#[from] SearchError),

    #[error("Page fetch failed: {0}")]
    FetchPage(#[from] CrawlError),

    #[error("Tool task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// JSON schema for a tool's arguments, without the root metadata
fn parameters<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| json!({}));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}

/// Arguments for web search.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchArgs {
    /// The search query.
    pub query: String,
}

/// Tool for finding supplier pages
#[derive(Clone)]
pub struct WebSearchTool<S> {
    search: S,
}

impl<S> WebSearchTool<S> {
    pub fn new(search: S) -> Self {
        Self { search }
    }
}

impl<S> Tool for WebSearchTool<S>
where
    S: WebSearch + Clone + 'static,
{
    const NAME: &'static str = "web_search";

    type Error = ToolError;
    type Args = WebSearchArgs;
    type Output = Vec<SearchHit>;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web for supplier pages that sell a product. Returns the URLs, titles and snippets of the top results.".to_string(),
            parameters: parameters::<WebSearchArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!("Agent searching for: {}", args.query);
        let search = self.search.clone();
        let hits = tokio::spawn(async move { search.search(&args.query, SEARCH_MAX_RESULTS).await })
            .await??;
        debug!(hits = hits.len(), "Search tool finished");
        Ok(hits)
    }
}

/// Arguments for fetching a page.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FetchPageArgs {
    /// The complete URL of the page, as returned by web_search.
    pub url: String,
}

/// Tool returning the beginning of a page's HTML
#[derive(Clone)]
pub struct FetchPageTool<F> {
    fetcher: F,
}

impl<F> FetchPageTool<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

impl<F> Tool for FetchPageTool<F>
where
    F: PageFetcher + Clone + 'static,
{
    const NAME: &'static str = "get_website_html";

    type Error = ToolError;
    type Args = FetchPageArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Fetch a web page and return the first 5000 characters of its HTML.".to_string(),
            parameters: parameters::<FetchPageArgs>(),
        }
    }

    /// A failed fetch is reported to the agent as text, not as a tool error
    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!("Agent fetching: {}", args.url);
        let fetcher = self.fetcher.clone();
        let url = args.url.clone();
        let fetched = tokio::spawn(async move { fetcher.fetch(&url).await }).await?;
        Ok(match fetched {
            Ok(page) => truncate_chars(&page.html, PAGE_HTML_CHARS).to_string(),
            Err(e) => format!("Error fetching {}: {}", args.url, e),
        })
    }
}
