//! # Schema Derivation Module
//!
//! Supplier listings for a category rarely agree on attribute names. This
//! module asks the model for one normalised attribute list and the products
//! rewritten under it, then persists the result.

use rig::completion::CompletionModel;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::extract::{parse_json, schema_inference_prompt, ExtractError, SupplierListing};
use crate::model::assistant_text;
use crate::store::{CatalogRecord, CatalogStore, StoredCatalog};

/// Listings included in the schema prompt
pub const MAX_SCHEMA_LISTINGS: usize = 10;

const SCHEMA_TEMPERATURE: f64 = 0.2;

/// The listings sent to the model for a category
pub fn schema_sample(listings: &[SupplierListing]) -> &[SupplierListing] {
    &listings[..listings.len().min(MAX_SCHEMA_LISTINGS)]
}

/// Infers a unified schema for a category's listings
#[derive(Clone)]
pub struct SchemaDeriver<C> {
    model: C,
}

impl<C> SchemaDeriver<C>
where
    C: CompletionModel,
{
    pub fn new(model: C) -> Self {
        Self { model }
    }

    /// Ask the model to unify `listings` under one schema
    ///
    /// Only the first [`MAX_SCHEMA_LISTINGS`] listings are sent. The
    /// returned record always carries `category`, whatever the model says.
    #[instrument(skip(self, listings), fields(listings = listings.len()))]
    pub async fn derive(
        &self,
        category: &str,
        listings: &[SupplierListing],
    ) -> std::result::Result<CatalogRecord, ExtractError> {
        let products_json = serde_json::to_string_pretty(schema_sample(listings))?;

        let response = self
            .model
            .completion_request(schema_inference_prompt(category, &products_json))
            .temperature(SCHEMA_TEMPERATURE)
            .send()
            .await?;

        let value = parse_json(&assistant_text(&response.choice))?;
        if !value.is_object() {
            return Err(ExtractError::Parse(format!(
                "expected a catalog object, got {}",
                value
            )));
        }
        let mut record: CatalogRecord = serde_json::from_value(value)?;
        if record.category != category {
            warn!(returned = %record.category, "Model renamed the category; keeping the requested name");
            record.category = category.to_string();
        }
        Ok(record)
    }
}

/// Derive a schema for a category's listings and persist it
#[allow(async_fn_in_trait)]
pub trait SchemaDeriveAndStore {
    /// Returns `None` when there was nothing to derive from
    async fn derive_and_store(
        &self,
        category: &str,
        listings: &[SupplierListing],
    ) -> Result<Option<StoredCatalog>>;
}

/// Schema derivation followed by a store upsert
pub struct DeriveAndStore<C, St> {
    deriver: SchemaDeriver<C>,
    store: St,
}

impl<C, St> DeriveAndStore<C, St>
where
    C: CompletionModel,
    St: CatalogStore,
{
    pub fn new(deriver: SchemaDeriver<C>, store: St) -> Self {
        Self { deriver, store }
    }
}

impl<C, St> SchemaDeriveAndStore for DeriveAndStore<C, St>
where
    C: CompletionModel,
    St: CatalogStore,
{
    async fn derive_and_store(
        &self,
        category: &str,
        listings: &[SupplierListing],
    ) -> Result<Option<StoredCatalog>> {
        if listings.is_empty() {
            return Ok(None);
        }
        let record = self.deriver.derive(category, listings).await?;
        let stored = self.store.save(&record).await?;
        info!(
            "Catalog for '{}' stored with {} products",
            stored.category,
            stored.products.len()
        );
        Ok(Some(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawProduct;
    use crate::model::mock_model::MockCompletionModel;
    use crate::store::StoreError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryStore {
        saved: Arc<Mutex<Vec<CatalogRecord>>>,
    }

    impl CatalogStore for MemoryStore {
        async fn save(&self, record: &CatalogRecord) -> std::result::Result<StoredCatalog, StoreError> {
            let mut saved = self.saved.lock().unwrap();
            saved.push(record.clone());
            Ok(StoredCatalog {
                id: saved.len() as i64,
                category: record.category.clone(),
                schema: record.schema.clone(),
                products: record.products.clone(),
                created_at: 0,
            })
        }
    }

    fn listings(n: usize) -> Vec<SupplierListing> {
        (0..n)
            .map(|i| SupplierListing {
                supplier: Some(format!("Supplier {}", i)),
                products: vec![RawProduct {
                    name: Some(format!("Block {}", i)),
                    ..RawProduct::default()
                }],
                ..SupplierListing::default()
            })
            .collect()
    }

    const CATALOG: &str = r#"```json
{"category": "Masonry", "schema": ["name", "size"], "products": [{"name": "Block 0", "size": "8 in"}]}
```"#;

    #[test]
    fn test_schema_sample_caps_listings() {
        let many = listings(12);
        let sample = schema_sample(&many);
        assert_eq!(sample.len(), MAX_SCHEMA_LISTINGS);
        assert_eq!(sample[9].supplier.as_deref(), Some("Supplier 9"));
        assert_eq!(schema_sample(&many[..3]).len(), 3);
    }

    #[tokio::test]
    async fn test_derive_keeps_requested_category() {
        let model = MockCompletionModel::new();
        model.push_text_response(CATALOG).await;
        let deriver = SchemaDeriver::new(model);

        let record = deriver.derive("Concrete blocks", &listings(2)).await.unwrap();

        assert_eq!(record.category, "Concrete blocks");
        assert_eq!(record.schema, vec!["name", "size"]);
        assert_eq!(record.products[0]["size"], "8 in");
    }

    #[tokio::test]
    async fn test_derive_rejects_non_object() {
        let model = MockCompletionModel::new();
        model.push_text_response("[1, 2, 3]").await;
        let deriver = SchemaDeriver::new(model);

        let result = deriver.derive("Concrete blocks", &listings(1)).await;

        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }

    #[tokio::test]
    async fn test_derive_and_store_saves_record() {
        let model = MockCompletionModel::new();
        model.push_text_response(CATALOG).await;
        let store = MemoryStore::default();
        let stage = DeriveAndStore::new(SchemaDeriver::new(model.clone()), store.clone());

        let stored = stage
            .derive_and_store("Concrete blocks", &listings(12))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored.category, "Concrete blocks");
        assert_eq!(store.saved.lock().unwrap().len(), 1);
        assert_eq!(model.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_no_listings_skips_model_and_store() {
        let model = MockCompletionModel::new();
        let store = MemoryStore::default();
        let stage = DeriveAndStore::new(SchemaDeriver::new(model.clone()), store.clone());

        assert!(stage
            .derive_and_store("Concrete blocks", &[])
            .await
            .unwrap()
            .is_none());
        assert_eq!(model.request_count().await, 0);
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_against_libsql() {
        let model = MockCompletionModel::new();
        model.push_text_response(CATALOG).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db").to_string_lossy().to_string();
        let db = crate::store::Database::new_from_path(&path).await.unwrap();
        let stage = DeriveAndStore::new(SchemaDeriver::new(model), db.clone());

        stage
            .derive_and_store("Concrete blocks", &listings(1))
            .await
            .unwrap();

        let saved = db.get_catalog("Concrete blocks").await.unwrap().unwrap();
        assert_eq!(saved.products.len(), 1);
    }
}
