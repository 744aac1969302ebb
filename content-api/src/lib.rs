//! Client for the authoritative content API.
//!
//! This crate provides:
//! - [`ContentFetcher`] trait for abstracting content API access
//! - [`ContentApiClient`] production client (token acquisition + per-type reads)
//! - [`MockContentClient`] mock client with pre-configured records and failures
//! - [`ContentSource`] config enum for choosing between mock and live clients
//!
//! ## Usage
//!
//! ```ignore
//! use content_api::{ContentApiConfig, ContentSource};
//! use search_indexer_shared::ContentType;
//!
//! let fetcher = ContentSource::live(ContentApiConfig::for_stage("staging", "api.example.com"))
//!     .into_fetcher();
//!
//! let record = fetcher.fetch_content(ContentType::Video, "acme", "v1").await?;
//! ```

mod client;
mod config;
mod mock;

pub use client::ContentApiClient;
pub use config::{ContentApiConfig, Identity};
pub use mock::MockContentClient;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use search_indexer_shared::ContentType;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ContentApiError {
    /// Token endpoint unreachable or answered non-2xx.
    #[error("token error: {0}")]
    Token(String),
    /// Content endpoint unreachable or answered non-2xx.
    #[error("content fetch error: {0}")]
    ContentFetch(String),
    /// Response body is not valid JSON or lacks the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
    /// No record registered (mock client only).
    #[error("not found: {0}")]
    NotFound(String),
    /// The content type has no content API resource.
    #[error("unsupported content type: {0}")]
    Unsupported(ContentType),
}

impl ContentApiError {
    pub fn token(msg: impl Into<String>) -> Self {
        Self::Token(msg.into())
    }

    pub fn content_fetch(msg: impl Into<String>) -> Self {
        Self::ContentFetch(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ContentApiError>;

/// Trait for reading authoritative content records.
///
/// Production code uses [`ContentApiClient`], while tests use
/// [`MockContentClient`]. Nothing is retried inside an implementation; retry
/// policy belongs to the caller.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Obtain an access token for `site` with the given identity.
    async fn resolve_token(&self, site: &str, identity: Identity) -> Result<String>;

    /// Fetch the authoritative record of one content item.
    ///
    /// Returns the record itself (envelopes such as the video `records` array
    /// are already unwrapped).
    async fn fetch_content(&self, content_type: ContentType, site: &str, id: &str) -> Result<Value>;
}

/// Resource path of a content type, or `None` for types not served by the API.
pub fn content_path(content_type: ContentType) -> Option<&'static str> {
    match content_type {
        ContentType::Video => Some("/content/videos"),
        ContentType::Article => Some("/content/article"),
        ContentType::Event => Some("/content/event"),
        ContentType::Audio => Some("/content/audio"),
        ContentType::Photo => Some("/content/photo"),
        ContentType::Series => None,
    }
}

/// Configuration for the content data source.
///
/// # Example
///
/// ```ignore
/// // Development/testing: serve pre-loaded records
/// let fetcher = ContentSource::mock(records).into_fetcher();
///
/// // Production: talk to the content API
/// let fetcher = ContentSource::live(config).into_fetcher();
/// ```
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// Mock client with `(content type, site, id)` → record mappings.
    Mock(HashMap<(ContentType, String, String), Value>),
    /// Live content API.
    Live(ContentApiConfig),
}

impl ContentSource {
    pub fn mock(records: HashMap<(ContentType, String, String), Value>) -> Self {
        Self::Mock(records)
    }

    pub fn live(config: ContentApiConfig) -> Self {
        Self::Live(config)
    }

    /// Create the matching [`ContentFetcher`] implementation.
    pub fn into_fetcher(self) -> Arc<dyn ContentFetcher> {
        match self {
            Self::Mock(records) => Arc::new(MockContentClient::with_records(records)),
            Self::Live(config) => Arc::new(ContentApiClient::new(config)),
        }
    }
}
