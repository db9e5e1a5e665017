//! CouchDB wire types.
//!
//! CouchDB documents are plain JSON, so model payloads flatten directly
//! into the stored envelope instead of going through a field-mapping layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document as stored in CouchDB: bookkeeping fields plus the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stored<T> {
    /// Document id, e.g. `video:<uuid>`.
    #[serde(rename = "_id")]
    pub id: String,

    /// Revision token. Absent on first write.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Discriminator used by Mango selectors (`video` or `frame`).
    #[serde(rename = "type")]
    pub doc_type: String,

    /// The model payload, flattened alongside the bookkeeping fields.
    #[serde(flatten)]
    pub doc: T,
}

impl<T> Stored<T> {
    /// Wrap a payload for a first write (no revision yet).
    pub fn new(id: impl Into<String>, doc_type: impl Into<String>, doc: T) -> Self {
        Self {
            id: id.into(),
            rev: None,
            doc_type: doc_type.into(),
            doc,
        }
    }
}

/// Acknowledgement returned by document writes and deletes.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteAck {
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

/// Mango `_find` request body.
#[derive(Debug, Clone, Serialize)]
pub struct FindRequest {
    pub selector: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_index: Option<String>,
}

impl FindRequest {
    /// A request with just a selector; everything else defaults off.
    pub fn with_selector(selector: Value) -> Self {
        Self {
            selector,
            sort: None,
            fields: None,
            limit: None,
            bookmark: None,
            use_index: None,
        }
    }
}

/// Mango `_find` response page.
#[derive(Debug, Clone, Deserialize)]
pub struct FindResponse<T> {
    pub docs: Vec<T>,
    /// Opaque continuation token. CouchDB returns one even on the last
    /// page; an empty `docs` on the follow-up query means exhaustion.
    #[serde(default)]
    pub bookmark: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Projection row carrying only the document id.
#[derive(Debug, Clone, Deserialize)]
pub struct DocId {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Projection row carrying id and revision, used for bulk deletes.
#[derive(Debug, Clone, Deserialize)]
pub struct DocRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
}

/// Mango `_index` creation request.
#[derive(Debug, Clone, Serialize)]
pub struct IndexRequest {
    pub index: IndexFields,
    pub name: String,
    pub ddoc: String,
    #[serde(rename = "type")]
    pub index_type: String,
}

impl IndexRequest {
    /// A JSON index over the given fields, named after its design doc.
    pub fn json(name: impl Into<String>, fields: Vec<String>) -> Self {
        let name = name.into();
        Self {
            index: IndexFields { fields },
            ddoc: name.clone(),
            name,
            index_type: "json".to_string(),
        }
    }
}

/// Field list for an index definition.
#[derive(Debug, Clone, Serialize)]
pub struct IndexFields {
    pub fields: Vec<String>,
}

/// Response to an `_index` creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexAck {
    /// Either `created` or `exists`.
    pub result: String,
}

/// Subset of the database info document used for health and stats.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseInfo {
    pub db_name: String,
    pub doc_count: u64,
    #[serde(default)]
    pub doc_del_count: u64,
}
