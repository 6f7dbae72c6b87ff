//! # Catalog - Building-Material Catalog Aggregation for Rust
//!
//! This crate builds product catalogs for the building-material categories
//! of the UNSPSC classification. Given a root code it finds every leaf
//! category beneath it, searches the web for suppliers of each category,
//! has a language model extract product listings from the supplier pages,
//! unifies those listings under one schema per category, and stores the
//! result in a local database.
//!
//! ## Features
//!
//! - Order-preserving, cycle-safe leaf resolution over the flat UNSPSC list
//! - Two extraction strategies:
//!   - A direct pipeline (search, fetch every hit, one structuring prompt)
//!   - A tool-calling agent that searches and browses on its own
//! - Rate-limited Gemini completions shared by every stage
//! - Per-category schema inference persisted with LibSQL
//! - Sequential, paced processing where one category never stops the run
//!
//! ## Example
//!
//! ```rust,no_run
//! use catalog::taxonomy::{resolve_leaves, ClassificationEntry};
//!
//! let entries = vec![
//!     ClassificationEntry::new("1", None, "22000000", "Building and Construction Machinery"),
//!     ClassificationEntry::new("2", Some("1"), "22101500", "Earth moving machinery"),
//! ];
//! let leaves = resolve_leaves(&entries, "22000000").unwrap();
//! assert_eq!(leaves[0].title, "Earth moving machinery");
//! ```

mod error;
pub mod model;

pub mod aggregator;
pub mod crawler;
pub mod extract;
pub mod schema;
pub mod search;
pub mod store;
pub mod taxonomy;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
