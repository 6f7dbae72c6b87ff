//! # Fetch Configuration Module
//!
//! Configuration for fetching supplier pages, built with a builder.
//!
//! ## Features
//!
//! - Per-page timeout matching the rendering budget of the extractors
//! - Exclusion selectors for boilerplate removed before text extraction
//! - User-agent customization

use std::time::Duration;

/// Configuration for page fetching and text cleanup
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for a single page fetch in milliseconds
    pub timeout_ms: u64,

    /// Whether to respect robots.txt
    pub respect_robots_txt: bool,

    /// User agent to use for requests
    pub user_agent: String,

    /// CSS selectors for elements dropped before extracting text
    pub exclude_selectors: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            respect_robots_txt: true,
            user_agent: format!("catalog-fetcher/{}", env!("CARGO_PKG_VERSION")),
            exclude_selectors: [
                "script", "style", "head", "meta", "nav", "footer", "noscript", "iframe",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Builder for FetchConfig
#[derive(Debug, Default)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    /// Set the per-page timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Set whether to respect robots.txt
    pub fn respect_robots_txt(mut self, respect_robots_txt: bool) -> Self {
        self.config.respect_robots_txt = respect_robots_txt;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the CSS selectors for elements to exclude
    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    pub fn build(self) -> FetchConfig {
        self.config
    }
}

impl FetchConfig {
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::new()
    }

    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.exclude_selectors.iter().any(|s| s == "script"));
        assert!(config.exclude_selectors.iter().any(|s| s == "footer"));
    }

    #[test]
    fn test_builder() {
        let config = FetchConfig::builder()
            .timeout_ms(500)
            .respect_robots_txt(false)
            .user_agent("test-agent")
            .exclude_selectors(vec![".ads".to_string()])
            .build();

        assert_eq!(config.timeout_ms, 500);
        assert!(!config.respect_robots_txt);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.exclude_selectors, vec![".ads".to_string()]);
    }
}
