//! Classification entries as delivered by the UNGM UNSPSC endpoint

use serde::{Deserialize, Deserializer, Serialize};

/// One node of the classification hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    /// Opaque unique identifier
    #[serde(rename = "Id", deserialize_with = "opaque_id")]
    pub id: String,

    /// Identifier of the parent entry, `None` for roots
    #[serde(
        rename = "ParentId",
        default,
        deserialize_with = "optional_opaque_id"
    )]
    pub parent_id: Option<String>,

    /// External classification code, e.g. `22101501`
    #[serde(rename = "UNSPSCode", deserialize_with = "opaque_id")]
    pub code: String,

    /// Human-readable label
    #[serde(rename = "Title", default)]
    pub title: String,
}

impl ClassificationEntry {
    pub fn new(
        id: impl Into<String>,
        parent_id: Option<&str>,
        code: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(String::from),
            code: code.into(),
            title: title.into(),
        }
    }
}

/// A leaf category found under a root code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafNode {
    /// UNSPSC code of the leaf
    pub code: String,

    /// Title of the leaf, used as the category name downstream
    pub title: String,
}

impl From<&ClassificationEntry> for LeafNode {
    fn from(entry: &ClassificationEntry) -> Self {
        LeafNode {
            code: entry.code.clone(),
            title: entry.title.clone(),
        }
    }
}

/// Top-level document returned by the entry endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDocument {
    #[serde(rename = "value", default)]
    pub entries: Vec<ClassificationEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
