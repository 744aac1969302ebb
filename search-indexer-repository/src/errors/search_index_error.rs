//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! covering both backend failures and request validation.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and `IndexGateway`. Two variants are
/// not failures from the gateway's point of view: `IndexAlreadyExists` (a lost
/// create race) and `DocumentNotFound` (deleting an absent document). Providers
/// report them so the gateway can decide to swallow them.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., a site that cannot be used as an index name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to check for or create an index.
    #[error("Index create error: {0}")]
    IndexCreateError(String),

    /// The index was created concurrently by someone else.
    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    /// Failed to write a document.
    #[error("Index write error: {0}")]
    IndexWriteError(String),

    /// Failed to delete a document.
    #[error("Index delete error: {0}")]
    IndexDeleteError(String),

    /// Document (or its index) not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Failed to serialize data for the search index backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_create(msg: impl Into<String>) -> Self {
        Self::IndexCreateError(msg.into())
    }

    /// Create an already-exists error for `index`.
    pub fn index_already_exists(index: &str) -> Self {
        Self::IndexAlreadyExists(index.to_string())
    }

    /// Create a document write error.
    pub fn index_write(msg: impl Into<String>) -> Self {
        Self::IndexWriteError(msg.into())
    }

    /// Create a document delete error.
    pub fn index_delete(msg: impl Into<String>) -> Self {
        Self::IndexDeleteError(msg.into())
    }

    /// Create a document not found error.
    pub fn document_not_found(index: &str, id: &str) -> Self {
        Self::DocumentNotFound(format!("index={}, id={}", index, id))
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}

impl From<serde_json::Error> for SearchIndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
