//! # Catalog Aggregation Module
//!
//! This module drives a whole run: resolve the leaf categories under a root
//! code once, then process them one at a time (extract supplier listings,
//! derive a schema, store it) with a pacing delay between categories.
//!
//! A failing or slow category is logged and skipped. Nothing that happens
//! while processing one category can stop the next one from running.
//!
//! Progress is reported through an optional channel of [`ProgressEvent`]s so
//! a caller can drive a progress bar without the loop knowing about it.

use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::extract::SearchAndExtract;
use crate::schema::SchemaDeriveAndStore;
use crate::store::StoredCatalog;
use crate::taxonomy::{EntrySource, LeafNode, LeafResolver};

/// Configuration for an aggregation run
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Pause between two categories
    pub delay: Duration,

    /// Upper bound on the time spent on one category
    pub category_timeout: Option<Duration>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(5000),
            category_timeout: None,
        }
    }
}

impl AggregatorConfig {
    pub fn builder() -> AggregatorConfigBuilder {
        AggregatorConfigBuilder::default()
    }
}

/// Builder for AggregatorConfig
#[derive(Debug, Default)]
pub struct AggregatorConfigBuilder {
    config: AggregatorConfig,
}

impl AggregatorConfigBuilder {
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn category_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.category_timeout = secs.map(Duration::from_secs);
        self
    }

    pub fn build(self) -> AggregatorConfig {
        self.config
    }
}

/// What happened to one category
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    /// A catalog was derived and saved
    Stored(StoredCatalog),

    /// No supplier listings were found
    Empty,

    /// Extraction or derivation failed
    Failed(String),

    /// The category took longer than the configured timeout
    TimedOut,
}

/// Events sent while a run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        index: usize,
        total: usize,
        category: String,
    },
    Finished {
        index: usize,
        category: String,
        outcome: CategoryOutcome,
    },
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub leaves: usize,
    pub stored: usize,
    pub empty: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &CategoryOutcome) {
        match outcome {
            CategoryOutcome::Stored(_) => self.stored += 1,
            CategoryOutcome::Empty => self.empty += 1,
            CategoryOutcome::Failed(_) => self.failed += 1,
            CategoryOutcome::TimedOut => self.timed_out += 1,
        }
    }
}

/// Fetch all entries and resolve the leaves under `root_code`
#[instrument(skip(source, resolver))]
pub async fn resolve_categories<E: EntrySource>(
    source: &E,
    root_code: &str,
    resolver: LeafResolver,
) -> Result<Vec<LeafNode>> {
    info!("Extracting leaf nodes from UNSPSC code {}", root_code);
    let entries = source.fetch_all_entries().await?;
    let leaves = resolver.resolve(&entries, root_code)?;
    info!("Found {} leaf categories", leaves.len());
    Ok(leaves)
}

/// Sequential per-category processing
pub struct CatalogAggregator<X, D> {
    extractor: X,
    deriver: D,
    config: AggregatorConfig,
}

impl<X, D> CatalogAggregator<X, D>
where
    X: SearchAndExtract,
    D: SchemaDeriveAndStore,
{
    pub fn new(extractor: X, deriver: D, config: AggregatorConfig) -> Self {
        Self {
            extractor,
            deriver,
            config,
        }
    }

    /// Resolve the categories and process every one of them
    ///
    /// Only a failure to obtain the categories is an error.
    pub async fn run_from_source<E: EntrySource>(
        &self,
        source: &E,
        root_code: &str,
        resolver: LeafResolver,
        progress: Option<Sender<ProgressEvent>>,
    ) -> Result<RunSummary> {
        let leaves = resolve_categories(source, root_code, resolver).await?;
        Ok(self.run(&leaves, progress).await)
    }

    /// Process categories in order, sleeping between them
    #[instrument(skip_all, fields(leaves = leaves.len()))]
    pub async fn run(
        &self,
        leaves: &[LeafNode],
        progress: Option<Sender<ProgressEvent>>,
    ) -> RunSummary {
        let mut summary = RunSummary {
            leaves: leaves.len(),
            ..RunSummary::default()
        };

        for (index, leaf) in leaves.iter().enumerate() {
            if let Some(tx) = &progress {
                let _ = tx
                    .send(ProgressEvent::Started {
                        index,
                        total: leaves.len(),
                        category: leaf.title.clone(),
                    })
                    .await;
            }

            let outcome = self.process_category(leaf).await;
            summary.record(&outcome);

            if let Some(tx) = &progress {
                let _ = tx
                    .send(ProgressEvent::Finished {
                        index,
                        category: leaf.title.clone(),
                        outcome,
                    })
                    .await;
            }

            if index + 1 < leaves.len() && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        info!(
            stored = summary.stored,
            empty = summary.empty,
            failed = summary.failed,
            timed_out = summary.timed_out,
            "Run finished"
        );
        summary
    }

    /// Extract, derive and store one category, never failing the run
    #[instrument(skip(self, leaf), fields(code = %leaf.code, category = %leaf.title))]
    pub async fn process_category(&self, leaf: &LeafNode) -> CategoryOutcome {
        info!("Processing category: {}", leaf.title);
        let work = self.extract_and_store(&leaf.title);
        match self.config.category_timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Processing '{}' timed out after {:?}", leaf.title, limit);
                    CategoryOutcome::TimedOut
                }
            },
            None => work.await,
        }
    }

    async fn extract_and_store(&self, category: &str) -> CategoryOutcome {
        let listings = match self.extractor.run(category).await {
            Ok(listings) => listings,
            Err(e) => {
                error!("Failed to process '{}': {}", category, e);
                return CategoryOutcome::Failed(e.to_string());
            }
        };
        if listings.is_empty() {
            info!("No supplier listings for '{}'", category);
            return CategoryOutcome::Empty;
        }

        match self.deriver.derive_and_store(category, &listings).await {
            Ok(Some(stored)) => CategoryOutcome::Stored(stored),
            Ok(None) => CategoryOutcome::Empty,
            Err(e) => {
                error!("Failed to process '{}': {}", category, e);
                CategoryOutcome::Failed(e.to_string())
            }
        }
    }
}
