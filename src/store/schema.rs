//! Table definitions for the catalog store

use super::error::StoreError;
use libsql::{Connection, params};

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    // One row per category; re-deriving a category replaces its row
    conn.execute(
        "CREATE TABLE IF NOT EXISTS catalogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL UNIQUE,
            schema_json TEXT NOT NULL,
            products_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create catalogs table: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_catalogs_created_at ON catalogs(created_at)",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create index on catalogs: {}", e)))?;

    Ok(())
}
