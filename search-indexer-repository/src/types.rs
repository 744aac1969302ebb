//! Request types for search index operations.

use serde_json::Value;

/// Request to write a document into an index.
///
/// The body replaces whatever is stored under `(index, id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocumentRequest {
    /// Target index name.
    pub index: String,
    /// Document id (the content id).
    pub id: String,
    /// Document body.
    pub body: Value,
}

/// Request to delete a document from an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDocumentRequest {
    /// Target index name.
    pub index: String,
    /// Document id (the content id).
    pub id: String,
}
