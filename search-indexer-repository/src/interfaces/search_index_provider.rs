//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search engine primitives,
//! allowing for different backend implementations (OpenSearch, in-memory, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{DeleteDocumentRequest, IndexDocumentRequest};

/// Abstracts the underlying search engine (OpenSearch, Elasticsearch, in-memory).
///
/// Implementations are injected into `IndexGateway`, which owns index naming,
/// create-on-demand and the idempotence rules. Providers only translate single
/// operations and report what the engine said.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether an index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` / `Ok(false)` - Whether the index exists
    /// * `Err(SearchIndexError::IndexCreateError)` - If the check itself fails
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create an index from a settings+mappings template.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchIndexError::IndexAlreadyExists)` - If the index already exists
    /// * `Err(SearchIndexError::IndexCreateError)` - If creation fails
    async fn create_index(&self, index: &str, template: &Value) -> Result<(), SearchIndexError>;

    /// Write (create or replace) a document with immediate visibility.
    ///
    /// Replace semantics: the stored document is exactly the request body.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was written
    /// * `Err(SearchIndexError::IndexWriteError)` - If the write fails
    async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchIndexError>;

    /// Delete a document with immediate visibility.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted
    /// * `Err(SearchIndexError::DocumentNotFound)` - If the document or its index doesn't exist
    /// * `Err(SearchIndexError::IndexDeleteError)` - If the deletion fails
    async fn delete_document(&self, request: &DeleteDocumentRequest) -> Result<(), SearchIndexError>;
}
