//! Error types for the taxonomy module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for classification lookups and entry sources
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// The requested root code is not present in the entry set
    #[error("UNSPSC code '{0}' not found in the data")]
    NotFound(String),

    /// The entry set contains a cycle reachable from the root
    #[error("Cyclic classification data: entry '{id}' revisited on the current path")]
    CyclicData {
        /// Id of the entry that was reached twice
        id: String,
    },

    /// More than one entry carries the requested code
    #[error("UNSPSC code '{code}' is shared by {count} entries")]
    DuplicateCode {
        /// The ambiguous code
        code: String,
        /// Number of entries sharing it
        count: usize,
    },

    /// The entry source could not be fetched or decoded
    #[error("Entry source unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing a cached entry file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TaxonomyError {
    fn from(err: reqwest::Error) -> Self {
        TaxonomyError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for TaxonomyError {
    fn from(err: serde_json::Error) -> Self {
        TaxonomyError::Unavailable(format!("malformed entry document: {}", err))
    }
}

impl From<TaxonomyError> for CrateError {
    fn from(err: TaxonomyError) -> Self {
        CrateError::Taxonomy(err.to_string())
    }
}
