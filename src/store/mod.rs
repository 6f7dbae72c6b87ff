//! Catalog persistence
//!
//! This module stores the unified catalog derived for each category in a
//! local libsql database, one row per category.

mod database;
pub mod error;
mod schema;

pub use database::Database;
pub use error::StoreError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A category's products under one inferred schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Category the products belong to
    pub category: String,

    /// Normalised attribute names shared by the products
    #[serde(default)]
    pub schema: Vec<String>,

    /// Products keyed by schema attribute
    #[serde(default)]
    pub products: Vec<Map<String, Value>>,
}

/// A catalog as stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCatalog {
    /// Row id
    pub id: i64,

    pub category: String,

    pub schema: Vec<String>,

    pub products: Vec<Map<String, Value>>,

    /// Unix timestamp of the last save
    pub created_at: i64,
}

/// Persistence capability used by the schema stage
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    /// Save a record, replacing any earlier record for the same category
    async fn save(&self, record: &CatalogRecord) -> Result<StoredCatalog, StoreError>;
}
