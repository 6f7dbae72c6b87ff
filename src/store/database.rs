//! Database operations for the catalog store

use super::error::StoreError;
use super::schema;
use super::{CatalogRecord, CatalogStore, StoredCatalog};
use libsql::{params, Connection, Row, Rows};
use tracing::{debug, instrument};

/// Catalog database backed by a libsql connection
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database manager
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, StoreError> {
        schema::initialize_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Create a new database manager from a path
    pub async fn new_from_path(path: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn).await
    }

    /// Execute a custom query with parameters
    pub async fn execute_query<P>(&self, sql: &str, params: P) -> Result<Rows, StoreError>
    where
        P: libsql::params::IntoParams,
    {
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to execute query: {}", e)))
    }

    /// Insert or replace the catalog for a category
    #[instrument(skip(self, record), fields(category = %record.category, products = record.products.len()))]
    pub async fn save_catalog(&self, record: &CatalogRecord) -> Result<StoredCatalog, StoreError> {
        let schema_json = serde_json::to_string(&record.schema)?;
        let products_json = serde_json::to_string(&record.products)?;
        let now = chrono::Utc::now().timestamp();

        self.conn
            .execute(
                "INSERT INTO catalogs (category, schema_json, products_json, created_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(category) DO UPDATE SET
                 schema_json = excluded.schema_json,
                 products_json = excluded.products_json,
                 created_at = excluded.created_at",
                params![record.category.clone(), schema_json, products_json, now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to save catalog: {}", e)))?;
        debug!("Catalog saved");

        self.get_catalog(&record.category).await?.ok_or_else(|| {
            StoreError::Data(format!("Catalog '{}' missing after save", record.category))
        })
    }

    /// Get the catalog stored for a category
    pub async fn get_catalog(&self, category: &str) -> Result<Option<StoredCatalog>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, category, schema_json, products_json, created_at
             FROM catalogs
             WHERE category = ?",
                params![category],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to get catalog: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_catalog(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Data(format!("Failed to get catalog: {}", e))),
        }
    }

    /// All stored catalogs, oldest first
    #[instrument(skip(self))]
    pub async fn list_catalogs(&self) -> Result<Vec<StoredCatalog>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, category, schema_json, products_json, created_at
             FROM catalogs
             ORDER BY id",
                params![],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to list catalogs: {}", e)))?;

        let mut catalogs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Data(format!("Failed to read catalog row: {}", e)))?
        {
            catalogs.push(row_to_catalog(&row)?);
        }

        Ok(catalogs)
    }
}

impl CatalogStore for Database {
    async fn save(&self, record: &CatalogRecord) -> Result<StoredCatalog, StoreError> {
        self.save_catalog(record).await
    }
}

/// Convert a database row to a StoredCatalog
fn row_to_catalog(row: &Row) -> Result<StoredCatalog, StoreError> {
    let schema_json: String = row
        .get(2)
        .map_err(|e| StoreError::Data(format!("Failed to get schema_json: {}", e)))?;
    let products_json: String = row
        .get(3)
        .map_err(|e| StoreError::Data(format!("Failed to get products_json: {}", e)))?;

    Ok(StoredCatalog {
        id: row
            .get(0)
            .map_err(|e| StoreError::Data(format!("Failed to get id: {}", e)))?,
        category: row
            .get(1)
            .map_err(|e| StoreError::Data(format!("Failed to get category: {}", e)))?,
        schema: serde_json::from_str(&schema_json)?,
        products: serde_json::from_str(&products_json)?,
        created_at: row
            .get(4)
            .map_err(|e| StoreError::Data(format!("Failed to get created_at: {}", e)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    use tempfile::tempdir;

    async fn setup_test_db() -> Result<(Database, tempfile::TempDir), StoreError> {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();

        let db = Database::new_from_path(&db_path).await?;

        Ok((db, temp_dir))
    }

    fn product(name: &str, size: &str) -> Map<String, Value> {
        json!({"name": name, "size": size})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn record(category: &str, products: Vec<Map<String, Value>>) -> CatalogRecord {
        CatalogRecord {
            category: category.to_string(),
            schema: vec!["name".to_string(), "size".to_string()],
            products,
        }
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();

        let mut result = db
            .execute_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name = 'catalogs'",
                params![],
            )
            .await
            .unwrap();

        let row = result.next().await.unwrap().unwrap();
        let table_name: String = row.get(0).unwrap();
        assert_eq!(table_name, "catalogs");
    }

    #[tokio::test]
    async fn test_save_and_get_catalog() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();

        let stored = db
            .save_catalog(&record("Concrete blocks", vec![product("Hollow block", "8 in")]))
            .await
            .unwrap();

        assert_eq!(stored.category, "Concrete blocks");
        assert_eq!(stored.schema, vec!["name", "size"]);
        assert_eq!(stored.products[0]["size"], "8 in");
        assert!(stored.created_at > 0);

        let fetched = db.get_catalog("Concrete blocks").await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert!(db.get_catalog("Rebar").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_category() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();

        let first = db
            .save_catalog(&record("Concrete blocks", vec![product("Hollow block", "8 in")]))
            .await
            .unwrap();
        let second = db
            .save_catalog(&record(
                "Concrete blocks",
                vec![product("Solid block", "6 in"), product("Paver", "4 in")],
            ))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let all = db.list_catalogs().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].products.len(), 2);
        assert_eq!(all[0].products[0]["name"], "Solid block");
    }

    #[tokio::test]
    async fn test_list_catalogs_in_insertion_order() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();

        db.save(&record("Rebar", vec![])).await.unwrap();
        db.save(&record("Cement", vec![])).await.unwrap();

        let categories: Vec<String> = db
            .list_catalogs()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(categories, vec!["Rebar", "Cement"]);
    }
}
