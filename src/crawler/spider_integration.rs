//! Integration with spider library for fetching supplier pages

use spider::website::Website;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::crawler::error::CrawlError;
use crate::crawler::{FetchConfig, FetchedPage, PageFetcher};

/// Fetches single pages with spider
///
/// With the `chrome` feature enabled spider renders the page in headless
/// Chrome before handing back the HTML.
#[derive(Debug, Clone, Default)]
pub struct SpiderFetcher {
    config: FetchConfig,
}

impl SpiderFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

impl PageFetcher for SpiderFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        fetch_page(url, &self.config).await
    }
}

/// Fetch one page without following links
#[instrument(skip(config))]
pub async fn fetch_page(url: &str, config: &FetchConfig) -> Result<FetchedPage, CrawlError> {
    url::Url::parse(url)?;
    debug!("Fetch config: {:?}", config);

    let mut website = Website::new(url);
    website
        .configuration
        .with_respect_robots_txt(config.respect_robots_txt)
        .with_user_agent(Some(&config.user_agent))
        .with_depth(0)
        .with_limit(1);

    let mut rx = website
        .subscribe(1)
        .ok_or_else(|| CrawlError::Other("Failed to subscribe to website".to_string()))?;
    let handle = tokio::spawn(async move {
        // only the first page matters, the limit keeps spider from sending more
        match rx.recv().await {
            Ok(page) => Some(FetchedPage {
                url: page.get_url().to_string(),
                html: page.get_html(),
            }),
            Err(_) => None,
        }
    });

    let finished = timeout(config.timeout(), website.crawl()).await;
    website.unsubscribe();

    if finished.is_err() {
        handle.abort();
        warn!("Fetch timed out after {:?}", config.timeout());
        return Err(CrawlError::Timeout(url.to_string()));
    }

    let page = handle
        .await
        .map_err(|e| CrawlError::Other(format!("Task join error: {}", e)))?
        .filter(|page| !page.html.trim().is_empty())
        .ok_or_else(|| CrawlError::EmptyPage(url.to_string()))?;

    info!("Fetched {} ({} bytes)", page.url, page.html.len());
    Ok(page)
}
