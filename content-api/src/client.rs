//! Production content API client.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use search_indexer_shared::ContentType;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::{ContentApiConfig, Identity};
use crate::{content_path, ContentApiError, ContentFetcher, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    authorization_token: String,
}

/// Client that reads tokens and content records over HTTP.
///
/// # Example
///
/// ```ignore
/// use content_api::{ContentApiClient, ContentApiConfig, ContentFetcher};
///
/// let client = ContentApiClient::new(ContentApiConfig::new("https://api.example.com"));
/// let article = client.fetch_content(ContentType::Article, "acme", "a1").await?;
/// ```
pub struct ContentApiClient {
    config: ContentApiConfig,
    client: ReqwestClient,
    tokens: RwLock<HashMap<(String, Identity), String>>,
}

impl ContentApiClient {
    pub fn new(config: ContentApiConfig) -> Self {
        ContentApiClient {
            config,
            client: ReqwestClient::new(),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ContentApiConfig {
        &self.config
    }

    async fn request_token(&self, site: &str, identity: Identity) -> Result<String> {
        let url = format!("{}{}", self.config.base_url, identity.token_path());
        let mut request = self.client.get(&url).query(&[("site", site)]);
        if identity == Identity::Server {
            if let Some(api_key) = &self.config.api_key {
                request = request.header("x-api-key", api_key);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| ContentApiError::token(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentApiError::token(format!(
                "{} token request for site '{}' failed with status {}: {}",
                identity, site, status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ContentApiError::token(e.to_string()))?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ContentApiError::parse(e.to_string()))?;

        Ok(token.authorization_token)
    }

    fn content_query<'a>(content_type: ContentType, site: &'a str, id: &'a str) -> [(&'static str, &'a str); 2] {
        match content_type {
            ContentType::Video => [("site", site), ("ids", id)],
            _ => [("site", site), ("id", id)],
        }
    }

    /// Pull the record out of the response body.
    ///
    /// Video responses wrap records in a `records` array; the other types
    /// return the record as the body.
    fn extract_record(content_type: ContentType, body: Value) -> Result<Value> {
        let record = match content_type {
            ContentType::Video => body
                .get("records")
                .and_then(|records| records.get(0))
                .cloned()
                .ok_or_else(|| ContentApiError::parse("video response has no records[0]"))?,
            _ => body,
        };

        if !record.is_object() {
            return Err(ContentApiError::parse(format!(
                "{} record is not an object",
                content_type
            )));
        }
        Ok(record)
    }
}

#[async_trait]
impl ContentFetcher for ContentApiClient {
    async fn resolve_token(&self, site: &str, identity: Identity) -> Result<String> {
        if !self.config.cache_tokens {
            return self.request_token(site, identity).await;
        }

        let key = (site.to_string(), identity);
        if let Some(token) = self.tokens.read().await.get(&key) {
            return Ok(token.clone());
        }

        let token = self.request_token(site, identity).await?;
        self.tokens.write().await.insert(key, token.clone());
        debug!(site = %site, identity = %identity, "Cached content API token");
        Ok(token)
    }

    async fn fetch_content(&self, content_type: ContentType, site: &str, id: &str) -> Result<Value> {
        let path = content_path(content_type).ok_or(ContentApiError::Unsupported(content_type))?;
        let token = self.resolve_token(site, self.config.read_identity).await?;

        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&Self::content_query(content_type, site, id))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ContentApiError::content_fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(site = %site, content_id = %id, content_type = %content_type, status = %status, "Content fetch failed");
            return Err(ContentApiError::content_fetch(format!(
                "{} '{}' for site '{}' failed with status {}: {}",
                content_type, id, site, status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ContentApiError::content_fetch(e.to_string()))?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| ContentApiError::parse(e.to_string()))?;

        Self::extract_record(content_type, body)
    }
}
