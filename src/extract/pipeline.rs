//! Direct extraction: search, fetch every hit, one structuring prompt

use futures::future;
use rig::completion::CompletionModel;
use tracing::{debug, error, info, instrument, warn};

use super::parsing::{bound_sections, parse_listings};
use super::prompts::catalog_prompt;
use super::{ExtractError, SearchAndExtract, SupplierListing};
use crate::crawler::{extract_text, FetchConfig, PageFetcher};
use crate::model::assistant_text;
use crate::search::{supplier_query, WebSearch};

/// Configuration for the direct pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search hits to fetch per category
    pub max_results: usize,

    /// Estimated token count above which page text is truncated
    pub token_budget: usize,

    /// Character cap applied to the encoded page text when over budget
    pub max_section_chars: usize,

    /// Sampling temperature for the extraction prompt
    pub temperature: f64,

    /// Selectors stripped from pages before extracting text
    pub exclude_selectors: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            token_budget: 6000,
            max_section_chars: 15_000,
            temperature: 0.2,
            exclude_selectors: FetchConfig::default().exclude_selectors,
        }
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.config.max_results = max_results;
        self
    }

    pub fn token_budget(mut self, token_budget: usize) -> Self {
        self.config.token_budget = token_budget;
        self
    }

    pub fn max_section_chars(mut self, max_section_chars: usize) -> Self {
        self.config.max_section_chars = max_section_chars;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Search, fetch and extract in one pass per category
pub struct CatalogPipeline<S, F, C> {
    search: S,
    fetcher: F,
    model: C,
    config: PipelineConfig,
}

impl<S, F, C> CatalogPipeline<S, F, C>
where
    S: WebSearch,
    F: PageFetcher,
    C: CompletionModel,
{
    pub fn new(search: S, fetcher: F, model: C, config: PipelineConfig) -> Self {
        Self {
            search,
            fetcher,
            model,
            config,
        }
    }

    /// URLs of the top search hits; search failures count as no hits
    async fn supplier_urls(&self, category: &str) -> Vec<String> {
        let query = supplier_query(category);
        info!("Searching for: {}", query);
        match self.search.search(&query, self.config.max_results).await {
            Ok(hits) => hits.into_iter().map(|hit| hit.url).collect(),
            Err(e) => {
                error!("Search failed for '{}': {}", category, e);
                Vec::new()
            }
        }
    }

    /// Visible text of a page, empty when the fetch fails
    async fn page_text(&self, url: &str) -> String {
        match self.fetcher.fetch(url).await {
            Ok(page) => extract_text(&page.html, &self.config.exclude_selectors),
            Err(e) => {
                error!("Failed to scrape {}: {}", url, e);
                String::new()
            }
        }
    }
}

impl<S, F, C> SearchAndExtract for CatalogPipeline<S, F, C>
where
    S: WebSearch,
    F: PageFetcher,
    C: CompletionModel,
{
    #[instrument(skip(self))]
    async fn run(&self, category: &str) -> Result<Vec<SupplierListing>, ExtractError> {
        let urls = self.supplier_urls(category).await;
        if urls.is_empty() {
            warn!("No supplier pages found for '{}'", category);
            return Ok(Vec::new());
        }

        info!("Scraping {} supplier pages", urls.len());
        let sections = future::join_all(urls.iter().map(|url| self.page_text(url))).await;
        if sections.iter().all(|s| s.is_empty()) {
            warn!("No page text extracted for '{}'", category);
            return Ok(Vec::new());
        }

        let bounded = bound_sections(
            &sections,
            self.config.token_budget,
            self.config.max_section_chars,
        );
        debug!(prompt_chars = bounded.len(), "Prepared page sections");

        info!("Sending content to LLM for product extraction");
        let response = self
            .model
            .completion_request(catalog_prompt(category, &bounded))
            .temperature(self.config.temperature)
            .send()
            .await?;

        let listings = parse_listings(&assistant_text(&response.choice))?;
        info!(
            "Extracted {} supplier listings for '{}'",
            listings.len(),
            category
        );
        Ok(listings)
    }
}
