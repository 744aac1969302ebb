//! In-memory search index provider for testing and local development.
//!
//! The `MemorySearchProvider` keeps indexes as nested maps and records every
//! call, so tests can assert both on the final index state and on the exact
//! operations the gateway issued. Failures can be scripted per document id.
//!
//! # Example
//!
//! ```ignore
//! use search_indexer_repository::{IndexGateway, IndexGatewayConfig, MemorySearchProvider};
//! use search_indexer_shared::ContentType;
//! use std::sync::Arc;
//!
//! let provider = Arc::new(MemorySearchProvider::new());
//! let gateway = IndexGateway::new(provider.clone(), IndexGatewayConfig::default(), ContentType::Video);
//! gateway.upsert("acme", "v1", &document).await?;
//! assert!(provider.document("acme", "v1").is_some());
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{DeleteDocumentRequest, IndexDocumentRequest};

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    IndexExists(String),
    CreateIndex(String),
    IndexDocument { index: String, id: String },
    DeleteDocument { index: String, id: String },
}

#[derive(Default)]
struct MemoryState {
    indexes: HashMap<String, HashMap<String, Value>>,
    templates: HashMap<String, Value>,
    calls: Vec<ProviderCall>,
    failing_writes: HashSet<String>,
    failing_deletes: HashSet<String>,
    hide_existing_indexes: bool,
}

/// In-memory provider that behaves like a single search node.
#[derive(Default)]
pub struct MemorySearchProvider {
    state: Mutex<MemoryState>,
}

impl MemorySearchProvider {
    /// Create a new empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes of document `id` fail with `IndexWriteError`.
    pub fn fail_writes_for(&self, id: impl Into<String>) {
        self.lock().failing_writes.insert(id.into());
    }

    /// Make deletes of document `id` fail with `IndexDeleteError`.
    pub fn fail_deletes_for(&self, id: impl Into<String>) {
        self.lock().failing_deletes.insert(id.into());
    }

    /// Report every index as missing from `index_exists`, so that creating an
    /// existing index hits the already-exists path (a lost creation race).
    pub fn simulate_create_race(&self) {
        self.lock().hide_existing_indexes = true;
    }

    /// Pre-create an index without recording a call.
    pub fn insert_index(&self, index: impl Into<String>) {
        self.lock().indexes.entry(index.into()).or_default();
    }

    /// The stored document, if any.
    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.lock()
            .indexes
            .get(index)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Number of documents stored in `index`.
    pub fn document_count(&self, index: &str) -> usize {
        self.lock().indexes.get(index).map_or(0, |docs| docs.len())
    }

    /// Whether `index` exists.
    pub fn has_index(&self, index: &str) -> bool {
        self.lock().indexes.contains_key(index)
    }

    /// The template an index was created with.
    pub fn template(&self, index: &str) -> Option<Value> {
        self.lock().templates.get(index).cloned()
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    /// Number of `index_document` calls recorded.
    pub fn write_count(&self) -> usize {
        self.count_calls(|call| matches!(call, ProviderCall::IndexDocument { .. }))
    }

    /// Number of `delete_document` calls recorded.
    pub fn delete_count(&self) -> usize {
        self.count_calls(|call| matches!(call, ProviderCall::DeleteDocument { .. }))
    }

    /// Number of `create_index` calls recorded.
    pub fn create_count(&self) -> usize {
        self.count_calls(|call| matches!(call, ProviderCall::CreateIndex(_)))
    }

    fn count_calls(&self, predicate: impl Fn(&ProviderCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means another test thread panicked mid-call
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SearchIndexProvider for MemorySearchProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::IndexExists(index.to_string()));
        Ok(!state.hide_existing_indexes && state.indexes.contains_key(index))
    }

    async fn create_index(&self, index: &str, template: &Value) -> Result<(), SearchIndexError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::CreateIndex(index.to_string()));
        if state.indexes.contains_key(index) {
            return Err(SearchIndexError::index_already_exists(index));
        }
        state.indexes.insert(index.to_string(), HashMap::new());
        state.templates.insert(index.to_string(), template.clone());
        Ok(())
    }

    async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchIndexError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::IndexDocument {
            index: request.index.clone(),
            id: request.id.clone(),
        });
        if state.failing_writes.contains(&request.id) {
            return Err(SearchIndexError::index_write(format!(
                "write rejected for {}",
                request.id
            )));
        }
        // Writing into a missing index auto-creates it, as the engine does
        state
            .indexes
            .entry(request.index.clone())
            .or_default()
            .insert(request.id.clone(), request.body.clone());
        Ok(())
    }

    async fn delete_document(&self, request: &DeleteDocumentRequest) -> Result<(), SearchIndexError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::DeleteDocument {
            index: request.index.clone(),
            id: request.id.clone(),
        });
        if state.failing_deletes.contains(&request.id) {
            return Err(SearchIndexError::index_delete(format!(
                "delete rejected for {}",
                request.id
            )));
        }
        match state
            .indexes
            .get_mut(&request.index)
            .and_then(|docs| docs.remove(&request.id))
        {
            Some(_) => Ok(()),
            None => Err(SearchIndexError::document_not_found(&request.index, &request.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_exists() {
        let provider = MemorySearchProvider::new();

        assert!(!provider.index_exists("acme").await.unwrap());
        provider.create_index("acme", &json!({})).await.unwrap();
        assert!(provider.index_exists("acme").await.unwrap());

        let second = provider.create_index("acme", &json!({})).await;
        assert!(matches!(second, Err(SearchIndexError::IndexAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_document_reports_not_found() {
        let provider = MemorySearchProvider::new();
        let request = DeleteDocumentRequest {
            index: "acme".to_string(),
            id: "v1".to_string(),
        };

        let result = provider.delete_document(&request).await;
        assert!(matches!(result, Err(SearchIndexError::DocumentNotFound(_))));
        assert_eq!(provider.delete_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_write_failure() {
        let provider = MemorySearchProvider::new();
        provider.fail_writes_for("bad");

        let request = IndexDocumentRequest {
            index: "acme".to_string(),
            id: "bad".to_string(),
            body: json!({}),
        };

        let result = provider.index_document(&request).await;
        assert!(matches!(result, Err(SearchIndexError::IndexWriteError(_))));
        assert!(provider.document("acme", "bad").is_none());
    }
}
