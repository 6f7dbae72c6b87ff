//! # UNSPSC Taxonomy Module
//!
//! This module turns the flat UNSPSC classification list into the set of
//! leaf categories the catalog pipeline works on. It is the first stage of a
//! run: nothing downstream can start until a root code resolves.
//!
//! ## Key Components
//!
//! - `ClassificationEntry`: One node of the hierarchy as served by UNGM
//! - `LeafNode`: A leaf category (code and title) found under a root
//! - `LeafResolver` / `resolve_leaves`: Depth-first leaf extraction
//! - `EntrySource`: Supplier of the flat list (`UngmEntrySource`, `FileEntrySource`)
//!
//! ## Features
//!
//! - Parent index built once per resolution, order preserving
//! - Explicit-stack traversal, safe on deep hierarchies
//! - Cycle detection on the current path
//! - Configurable handling of duplicated root codes
//! - Cached entry files in the same JSON shape as the API

mod entry;
mod error;
mod resolver;
mod source;

pub use entry::{ClassificationEntry, EntryDocument, LeafNode};
pub use error::TaxonomyError;
pub use resolver::{resolve_leaves, DuplicateCodePolicy, LeafResolver, ParentIndex};
pub use source::{save_entries, EntrySource, FileEntrySource, UngmEntrySource, UNGM_UNSPSC_URL};
