//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    DeleteParts, IndexParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{DeleteDocumentRequest, IndexDocumentRequest};

/// Error type OpenSearch reports when creating an index that already exists.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// OpenSearch provider implementation.
///
/// One instance (and one underlying HTTP client) is shared by every pipeline in
/// the process; all methods take `&self` and are safe to call concurrently.
///
/// # Example
///
/// ```ignore
/// use search_indexer_repository::{IndexDocumentRequest, OpenSearchProvider, SearchIndexProvider};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200").await?;
///
/// let request = IndexDocumentRequest {
///     index: "acme".to_string(),
///     id: "v1".to_string(),
///     body: serde_json::json!({ "type": "video", "videoTitle": "X" }),
/// };
/// provider.index_document(&request).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError::ValidationError)` - If the URL does not parse
    /// * `Err(SearchIndexError::ConnectionError)` - If the transport cannot be built
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url = Url::parse(url)
            .map_err(|e| SearchIndexError::validation(format!("Invalid URL '{}': {}", url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self { client })
    }

    /// Check that the cluster answers.
    ///
    /// [`OpenSearchProvider::new`] does no network I/O, so this is the readiness
    /// gate used before the indexer starts consuming.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the cluster responded with a success status
    /// * `Err(SearchIndexError::ConnectionError)` - If it is unreachable or unhealthy
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }

        debug!("OpenSearch cluster is reachable");
        Ok(())
    }

    /// Whether an error body reports that the index already exists.
    fn is_already_exists(body: &str) -> bool {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => value["error"]["type"] == ALREADY_EXISTS_ERROR,
            Err(_) => body.contains(ALREADY_EXISTS_ERROR),
        }
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_create(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                error!(index = %index, status = status, body = %error_body, "Index exists check failed");
                Err(SearchIndexError::index_create(format!(
                    "Exists check for '{}' failed with status {}: {}",
                    index, status, error_body
                )))
            }
        }
    }

    /// Create an index from a template.
    ///
    /// A `resource_already_exists_exception` response is reported as
    /// `IndexAlreadyExists` so the caller can treat a lost creation race as success.
    async fn create_index(&self, index: &str, template: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(template.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_create(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if Self::is_already_exists(&error_body) {
                debug!(index = %index, "Index already exists");
                return Err(SearchIndexError::index_already_exists(index));
            }
            error!(index = %index, status = %status, body = %error_body, "Create index request failed");
            return Err(SearchIndexError::index_create(format!(
                "Create index '{}' failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index created");
        Ok(())
    }

    async fn index_document(&self, request: &IndexDocumentRequest) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&request.index, &request.id))
            .refresh(Refresh::True)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_write(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::index_write(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %request.index, doc_id = %request.id, "Document indexed");
        Ok(())
    }

    async fn delete_document(&self, request: &DeleteDocumentRequest) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(&request.index, &request.id))
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(|e| SearchIndexError::index_delete(e.to_string()))?;

        let status = response.status_code();

        // 404 covers both a missing document and a missing index
        if status.as_u16() == 404 {
            return Err(SearchIndexError::document_not_found(&request.index, &request.id));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(SearchIndexError::index_delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %request.index, doc_id = %request.id, "Document deleted");
        Ok(())
    }
}
