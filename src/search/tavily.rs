//! Tavily search API client

use std::time::Duration;

use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::error::SearchError;
use super::{SearchHit, WebSearch};

/// Tavily requests are cut off after this many seconds
const DEFAULT_TIMEOUT_SECS: u64 = 15;

const TAVILY_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Client for the Tavily `/search` endpoint
#[derive(Clone)]
pub struct TavilyClient {
    client: ReqwestClient,
    base_url: String,
    api_key: String,
    search_depth: String,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("base_url", &self.base_url)
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: TAVILY_BASE_URL.to_string(),
            api_key: api_key.into(),
            search_depth: "advanced".to_string(),
        }
    }

    /// Build a client from `TAVILY_API_KEY`
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = std::env::var("TAVILY_API_KEY").map_err(|_| {
            SearchError::Auth("TAVILY_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl WebSearch for TavilyClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let body = SearchRequest {
            query,
            search_depth: &self.search_depth,
            max_results,
        };

        debug!("Sending search request");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!("Search API error: {} - {}", status, text);
            return Err(if status == StatusCode::UNAUTHORIZED {
                SearchError::Auth("Invalid Tavily API key".to_string())
            } else {
                SearchError::Api {
                    status_code: status.as_u16(),
                    message: text,
                }
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&text)?;
        let hits = parsed
            .results
            .into_iter()
            .filter_map(|r| {
                let url = r.url.filter(|u| !u.is_empty())?;
                Some(SearchHit {
                    url,
                    title: r.title,
                    content: r.content,
                })
            })
            .take(max_results)
            .collect::<Vec<_>>();

        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }
}
