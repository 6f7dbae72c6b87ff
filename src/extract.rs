//! # Supplier Listing Extraction Module
//!
//! This module turns a product category name into supplier listings: which
//! suppliers sell products in the category, and what those products are.
//!
//! ## Key Components
//!
//! - `SearchAndExtract`: The per-category extraction capability
//! - `CatalogPipeline`: Search, fetch every hit, then a single structuring prompt
//! - `CatalogAgent`: A tool-calling agent that searches and browses on its own
//! - `ExtractionStrategy`: Either of the two, chosen at startup
//!
//! ## Output
//!
//! Listings are loosely typed. Product attributes differ per supplier, so
//! anything the model returns beyond the known fields is kept as raw JSON and
//! unified later by the schema stage.

mod agent;
mod error;
mod parsing;
mod pipeline;
mod prompts;
mod tools;

use rig::completion::CompletionModel;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::crawler::PageFetcher;
use crate::search::WebSearch;

pub use agent::{AgentConfig, CatalogAgent};
pub use error::ExtractError;
pub use parsing::{bound_sections, estimate_tokens, parse_json, parse_listings, strip_code_fences};
pub use pipeline::{CatalogPipeline, PipelineConfig, PipelineConfigBuilder};
pub use prompts::schema_inference_prompt;
pub use tools::{FetchPageTool, ToolError, WebSearchTool};

/// Products offered by one supplier, as reported by the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierListing {
    #[serde(default)]
    pub supplier: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<RawProduct>,

    /// Any other fields the model added
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A product before schema unification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub specs: Map<String, Value>,

    /// Price as given, usually a string with currency
    #[serde(default)]
    pub price: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Find and extract supplier listings for one category
///
/// An empty result means nothing usable was found; errors are reserved for
/// failures of the model call or of its output.
#[allow(async_fn_in_trait)]
pub trait SearchAndExtract {
    async fn run(&self, category: &str) -> Result<Vec<SupplierListing>, ExtractError>;
}

/// Extraction strategy chosen at startup
pub enum ExtractionStrategy<C, S, F>
where
    C: CompletionModel,
{
    Pipeline(CatalogPipeline<S, F, C>),
    Agentic(CatalogAgent<C>),
}

impl<C, S, F> SearchAndExtract for ExtractionStrategy<C, S, F>
where
    C: CompletionModel + 'static,
    S: WebSearch,
    F: PageFetcher,
{
    async fn run(&self, category: &str) -> Result<Vec<SupplierListing>, ExtractError> {
        match self {
            ExtractionStrategy::Pipeline(pipeline) => pipeline.run(category).await,
            ExtractionStrategy::Agentic(agent) => agent.run(category).await,
        }
    }
}
