//! Sources for the flat UNSPSC entry list

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use tokio::fs;
use tracing::{debug, error, info, instrument};

use crate::taxonomy::entry::{ClassificationEntry, EntryDocument};
use crate::taxonomy::error::TaxonomyError;

/// UNGM endpoint serving the full UNSPSC hierarchy
pub const UNGM_UNSPSC_URL: &str = "https://www.ungm.org/API/UNSPSCs";

/// Default timeout for the entry download in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Anything that can hand over the complete classification list
pub trait EntrySource {
    fn fetch_all_entries(
        &self,
    ) -> impl Future<Output = Result<Vec<ClassificationEntry>, TaxonomyError>> + Send;
}

/// Fetches entries from the UNGM API
#[derive(Debug, Clone)]
pub struct UngmEntrySource {
    client: ReqwestClient,
    url: String,
}

impl Default for UngmEntrySource {
    fn default() -> Self {
        Self::new()
    }
}

impl UngmEntrySource {
    pub fn new() -> Self {
        Self::with_url(UNGM_UNSPSC_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        // The endpoint rejects requests without a browser-like user agent
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0")
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
        }
    }
}

impl EntrySource for UngmEntrySource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_all_entries(&self) -> Result<Vec<ClassificationEntry>, TaxonomyError> {
        info!("Fetching UNSPSC hierarchy");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Entry source error: {} - {}", status, body);
            return Err(TaxonomyError::Unavailable(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        let doc: EntryDocument = serde_json::from_str(&body)?;
        info!("Fetched {} classification entries", doc.entries.len());
        Ok(doc.entries)
    }
}

/// Loads a previously saved entry list from disk
#[derive(Debug, Clone)]
pub struct FileEntrySource {
    path: PathBuf,
}

impl FileEntrySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EntrySource for FileEntrySource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_all_entries(&self) -> Result<Vec<ClassificationEntry>, TaxonomyError> {
        let content = fs::read_to_string(&self.path).await?;
        let doc: EntryDocument = serde_json::from_str(&content)?;
        debug!("Loaded {} cached entries", doc.entries.len());
        Ok(doc.entries)
    }
}

/// Write entries in the same document shape the UNGM endpoint serves
pub async fn save_entries(
    path: impl AsRef<Path>,
    entries: &[ClassificationEntry],
) -> Result<(), TaxonomyError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let doc = EntryDocument {
        entries: entries.to_vec(),
    };
    let json = serde_json::to_string(&doc).map_err(|e| {
        TaxonomyError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_entries_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/API/UNSPSCs")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"value": [
                    {"Id": "1", "ParentId": null, "UNSPSCode": "22", "Title": "Root"},
                    {"Id": "2", "ParentId": "1", "UNSPSCode": "2210", "Title": "Leaf"}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let source = UngmEntrySource::with_url(format!("{}/API/UNSPSCs", server.url()));
        let entries = source.fetch_all_entries().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].parent_id.as_deref(), Some("1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_entries_http_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/API/UNSPSCs")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let source = UngmEntrySource::with_url(format!("{}/API/UNSPSCs", server.url()));
        let result = source.fetch_all_entries().await;

        assert!(matches!(result, Err(TaxonomyError::Unavailable(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_entries_malformed_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/API/UNSPSCs")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let source = UngmEntrySource::with_url(format!("{}/API/UNSPSCs", server.url()));
        assert!(matches!(
            source.fetch_all_entries().await,
            Err(TaxonomyError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_save_and_load_cached_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("unspsc.json");
        let entries = vec![
            ClassificationEntry::new("1", None, "22", "Root"),
            ClassificationEntry::new("2", Some("1"), "2210", "Leaf"),
        ];

        save_entries(&path, &entries).await.unwrap();
        let loaded = FileEntrySource::new(&path).fetch_all_entries().await.unwrap();

        assert_eq!(loaded, entries);
    }

    #[tokio::test]
    async fn test_missing_cache_file() {
        let source = FileEntrySource::new("/nonexistent/unspsc.json");
        assert!(matches!(
            source.fetch_all_entries().await,
            Err(TaxonomyError::Io(_))
        ));
    }
}
