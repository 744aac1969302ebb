//! Mock content client for testing and local development.
//!
//! The `MockContentClient` can be pre-populated with records keyed by
//! `(content type, site, id)` and scripted to fail token or content requests,
//! allowing pipeline tests to run without network access.
//!
//! # Example
//!
//! ```ignore
//! use content_api::{ContentFetcher, MockContentClient};
//! use search_indexer_shared::ContentType;
//!
//! let client = MockContentClient::new();
//! client.register_record(ContentType::Video, "acme", "v1", json!({"gist": {"title": "X"}}));
//! client.fail_fetch_for("v2");
//!
//! let record = client.fetch_content(ContentType::Video, "acme", "v1").await?;
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use search_indexer_shared::ContentType;
use serde_json::Value;

use crate::config::Identity;
use crate::{ContentApiError, ContentFetcher, Result};

type RecordKey = (ContentType, String, String);

#[derive(Default)]
struct MockState {
    records: HashMap<RecordKey, Value>,
    failing_fetches: HashSet<String>,
    failing_token_sites: HashSet<String>,
}

/// Mock content client that returns pre-configured records.
#[derive(Default)]
pub struct MockContentClient {
    state: RwLock<MockState>,
    fetches: AtomicUsize,
}

impl MockContentClient {
    /// Create a new empty mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client pre-populated with the given records.
    pub fn with_records(records: HashMap<RecordKey, Value>) -> Self {
        let client = Self::new();
        client.write().records = records;
        client
    }

    /// Register the record returned for `(content_type, site, id)`.
    pub fn register_record(&self, content_type: ContentType, site: &str, id: &str, record: Value) {
        self.write()
            .records
            .insert((content_type, site.to_string(), id.to_string()), record);
    }

    /// Make every fetch of content `id` fail with `ContentFetch`.
    pub fn fail_fetch_for(&self, id: impl Into<String>) {
        self.write().failing_fetches.insert(id.into());
    }

    /// Make token requests for `site` fail with `Token`.
    pub fn fail_token_for(&self, site: impl Into<String>) {
        self.write().failing_token_sites.insert(site.into());
    }

    /// Number of `fetch_content` calls made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, MockState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MockState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ContentFetcher for MockContentClient {
    async fn resolve_token(&self, site: &str, identity: Identity) -> Result<String> {
        if self.read().failing_token_sites.contains(site) {
            return Err(ContentApiError::token(format!("token rejected for site {}", site)));
        }
        Ok(format!("mock-{}-{}", identity, site))
    }

    async fn fetch_content(&self, content_type: ContentType, site: &str, id: &str) -> Result<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.resolve_token(site, Identity::Anonymous).await?;

        let state = self.read();
        if state.failing_fetches.contains(id) {
            return Err(ContentApiError::content_fetch(format!(
                "{} '{}' unavailable",
                content_type, id
            )));
        }
        state
            .records
            .get(&(content_type, site.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| {
                ContentApiError::NotFound(format!("{} {}/{} not in mock", content_type, site, id))
            })
    }
}
