//! Index gateway implementation.
//!
//! This module provides the high-level API the indexing pipelines use to write
//! and remove documents. It owns the rules that make those operations safe to
//! repeat:
//!
//! - the per-site index is created on first write (check, then create), and a
//!   concurrent creation by a sibling pipeline counts as success;
//! - writes replace the whole document, so repeating an upsert converges;
//! - deleting a document that doesn't exist is not an error.

use std::sync::Arc;

use search_indexer_shared::{ContentType, IndexDocument};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::{IndexGatewayConfig, IndexLayout};
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::get_index_template;
use crate::types::{DeleteDocumentRequest, IndexDocumentRequest};
use crate::utils;

/// Gateway to the search engine for one content type.
///
/// Handles are cheap to clone; every handle shares the same provider (and so
/// the same engine connection). The content type only matters for index naming
/// and templates under `IndexLayout::SiteAndBucket`.
///
/// # Example
///
/// ```no_run
/// use search_indexer_repository::{IndexGateway, IndexGatewayConfig, OpenSearchProvider};
/// use search_indexer_shared::ContentType;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(OpenSearchProvider::new("http://localhost:9200").await?);
/// let gateway = IndexGateway::new(provider, IndexGatewayConfig::default(), ContentType::Video);
///
/// // REMOVE events for content that was never indexed are fine
/// gateway.delete("acme", "v1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IndexGateway {
    provider: Arc<dyn SearchIndexProvider>,
    config: IndexGatewayConfig,
    content_type: ContentType,
}

impl IndexGateway {
    /// Create a gateway handle for `content_type`.
    pub fn new(
        provider: Arc<dyn SearchIndexProvider>,
        config: IndexGatewayConfig,
        content_type: ContentType,
    ) -> Self {
        Self {
            provider,
            config,
            content_type,
        }
    }

    /// A handle sharing this gateway's provider and config, bound to another content type.
    pub fn for_content_type(&self, content_type: ContentType) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
            content_type,
        }
    }

    /// The content type this handle writes.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The index that holds this content type's documents for `site`.
    pub fn index_name(&self, site: &str) -> Result<String, SearchIndexError> {
        utils::index_name(site, self.config.layout, self.content_type.bucket())
    }

    /// The settings+mappings template used when this handle creates an index.
    pub fn template(&self) -> Value {
        let content_types: Vec<ContentType> = match self.config.layout {
            IndexLayout::SitePerIndex => ContentType::ALL.to_vec(),
            IndexLayout::SiteAndBucket => ContentType::ALL
                .into_iter()
                .filter(|content_type| content_type.bucket() == self.content_type.bucket())
                .collect(),
        };
        get_index_template(&self.config.settings, &content_types)
    }

    /// Write or replace the document for `(site, content_id)`.
    ///
    /// Ensures the site index exists first. The write uses refresh so the
    /// document is searchable as soon as this returns.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was written
    /// * `Err(SearchIndexError::IndexCreateError)` - If the index could not be created
    /// * `Err(SearchIndexError::IndexWriteError)` - If the write failed
    #[instrument(skip(self, document), fields(content_type = %self.content_type))]
    pub async fn upsert(
        &self,
        site: &str,
        content_id: &str,
        document: &IndexDocument,
    ) -> Result<(), SearchIndexError> {
        let index = self.index_name(site)?;
        self.ensure_index(&index).await?;

        let body = serde_json::to_value(document)?;
        let request = IndexDocumentRequest {
            index,
            id: content_id.to_string(),
            body,
        };
        self.provider.index_document(&request).await?;

        debug!(index = %request.index, content_id = %content_id, "Document upserted");
        Ok(())
    }

    /// Delete the document for `(site, content_id)`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If a document was deleted
    /// * `Ok(false)` - If there was nothing to delete
    /// * `Err(SearchIndexError::IndexDeleteError)` - If the deletion failed
    #[instrument(skip(self), fields(content_type = %self.content_type))]
    pub async fn delete(&self, site: &str, content_id: &str) -> Result<bool, SearchIndexError> {
        let request = DeleteDocumentRequest {
            index: self.index_name(site)?,
            id: content_id.to_string(),
        };

        match self.provider.delete_document(&request).await {
            Ok(()) => {
                debug!(index = %request.index, content_id = %content_id, "Document deleted");
                Ok(true)
            }
            Err(SearchIndexError::DocumentNotFound(_)) => {
                debug!(
                    index = %request.index,
                    content_id = %content_id,
                    "Document not found, nothing to delete"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Create `index` from `template`, treating an existing index as success.
    pub async fn create_index(&self, index: &str, template: &Value) -> Result<(), SearchIndexError> {
        utils::validate_index_name(index)?;
        match self.provider.create_index(index, template).await {
            Ok(()) => {
                info!(index = %index, content_type = %self.content_type, "Created index");
                Ok(())
            }
            Err(SearchIndexError::IndexAlreadyExists(_)) => {
                debug!(index = %index, "Index created concurrently, continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Check that `index` exists and create it from this handle's template if not.
    pub async fn ensure_index(&self, index: &str) -> Result<(), SearchIndexError> {
        if self.provider.index_exists(index).await? {
            return Ok(());
        }
        self.create_index(index, &self.template()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySearchProvider, ProviderCall};
    use search_indexer_shared::{VideoDocument, PhotoDocument};
    use serde_json::json;

    fn video(title: &str) -> IndexDocument {
        IndexDocument::Video(VideoDocument {
            title: Some(title.to_string()),
            data: json!({"id": "v1"}),
            ..Default::default()
        })
    }

    fn gateway(provider: Arc<MemorySearchProvider>, layout: IndexLayout) -> IndexGateway {
        IndexGateway::new(
            provider,
            IndexGatewayConfig::with_layout(layout),
            ContentType::Video,
        )
    }

    #[tokio::test]
    async fn test_upsert_creates_missing_index() {
        let provider = Arc::new(MemorySearchProvider::new());
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        gateway.upsert("acme", "v1", &video("X")).await.unwrap();

        assert!(provider.has_index("acme"));
        assert_eq!(provider.create_count(), 1);
        let stored = provider.document("acme", "v1").unwrap();
        assert_eq!(stored["type"], "video");
        assert_eq!(stored["videoTitle"], "X");
    }

    #[tokio::test]
    async fn test_upsert_skips_create_when_index_exists() {
        let provider = Arc::new(MemorySearchProvider::new());
        provider.insert_index("acme");
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        gateway.upsert("acme", "v1", &video("X")).await.unwrap();

        assert_eq!(provider.create_count(), 0);
        assert_eq!(provider.write_count(), 1);
    }

    #[tokio::test]
    async fn test_upsert_tolerates_create_race() {
        let provider = Arc::new(MemorySearchProvider::new());
        provider.insert_index("acme");
        provider.simulate_create_race();
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        gateway.upsert("acme", "v1", &video("X")).await.unwrap();

        assert_eq!(provider.create_count(), 1);
        assert!(provider.document("acme", "v1").is_some());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let provider = Arc::new(MemorySearchProvider::new());
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        gateway.upsert("acme", "v1", &video("X")).await.unwrap();
        let first = provider.document("acme", "v1").unwrap();
        gateway.upsert("acme", "v1", &video("X")).await.unwrap();
        let second = provider.document("acme", "v1").unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.document_count("acme"), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_rather_than_merges() {
        let provider = Arc::new(MemorySearchProvider::new());
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        gateway.upsert("acme", "v1", &video("Old")).await.unwrap();
        gateway.upsert("acme", "v1", &video("New")).await.unwrap();

        assert_eq!(provider.document("acme", "v1").unwrap()["videoTitle"], "New");
    }

    #[tokio::test]
    async fn test_upsert_write_failure() {
        let provider = Arc::new(MemorySearchProvider::new());
        provider.fail_writes_for("v1");
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        let result = gateway.upsert("acme", "v1", &video("X")).await;
        assert!(matches!(result, Err(SearchIndexError::IndexWriteError(_))));
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_site() {
        let provider = Arc::new(MemorySearchProvider::new());
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        let result = gateway.upsert("a/b", "v1", &video("X")).await;
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_not_an_error() {
        let provider = Arc::new(MemorySearchProvider::new());
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        assert!(!gateway.delete("acme", "v1").await.unwrap());
        assert!(!gateway.delete("acme", "v1").await.unwrap());
        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::DeleteDocument {
                    index: "acme".to_string(),
                    id: "v1".to_string()
                };
                2
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_existing_document() {
        let provider = Arc::new(MemorySearchProvider::new());
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        gateway.upsert("acme", "v1", &video("X")).await.unwrap();
        assert!(gateway.delete("acme", "v1").await.unwrap());
        assert!(provider.document("acme", "v1").is_none());
    }

    #[tokio::test]
    async fn test_delete_failure_propagates() {
        let provider = Arc::new(MemorySearchProvider::new());
        provider.fail_deletes_for("v1");
        let gateway = gateway(provider.clone(), IndexLayout::SitePerIndex);

        let result = gateway.delete("acme", "v1").await;
        assert!(matches!(result, Err(SearchIndexError::IndexDeleteError(_))));
    }

    #[tokio::test]
    async fn test_bucket_layout_uses_bucket_index_and_template() {
        let provider = Arc::new(MemorySearchProvider::new());
        let gateway = gateway(provider.clone(), IndexLayout::SiteAndBucket)
            .for_content_type(ContentType::Photo);
        let document = IndexDocument::Photo(PhotoDocument::default());

        gateway.upsert("acme", "p1", &document).await.unwrap();

        assert!(provider.document("acme-photos", "p1").is_some());
        let template = provider.template("acme-photos").unwrap();
        let properties = template["mappings"]["properties"].as_object().unwrap();
        assert!(properties.contains_key("photoTitle"));
        assert!(!properties.contains_key("videoTitle"));
    }
}
