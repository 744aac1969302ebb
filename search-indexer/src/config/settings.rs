//! Indexer settings read from the environment.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use content_api::{ContentApiConfig, Identity};
use search_indexer_repository::{IndexGatewayConfig, IndexLayout, IndexSettings};
use tracing::warn;

use crate::consumer::DEFAULT_CHANGE_EVENTS_TOPIC;
use crate::processor::fields::parse_skip_words;
use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Lowest search API major version supporting typeless writes.
const MIN_SEARCH_API_VERSION: u32 = 7;

/// Default Kafka broker address.
const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "content-search-indexer";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

const DEFAULT_STAGE: &str = "dev";

const DEFAULT_CONTENT_API_DOMAIN: &str = "api.content.local";

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection until successful.
    Retry,
}

impl ConnectionMode {
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Anything else falls back to "retry".
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Everything the indexer reads from its environment.
#[derive(Debug, Clone)]
pub struct IndexerSettings {
    pub opensearch_url: String,
    pub search_api_version: u32,
    pub connection_mode: ConnectionMode,
    pub retry_interval_secs: u64,
    pub gateway: IndexGatewayConfig,
    pub stage: String,
    pub content_api: ContentApiConfig,
    pub skip_words: Vec<String>,
    pub kafka_broker: String,
    pub kafka_group_id: String,
    pub change_events_topic: String,
}

impl IndexerSettings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `SEARCH_API_VERSION`: search engine API major version (default: 7, minimum 7)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `INDEX_LAYOUT`: "site" or "site-bucket" (default: site)
    /// - `INDEX_SHARDS` / `INDEX_REPLICAS`: template settings (default: 1 / 1)
    /// - `STAGE`: deployment stage (default: dev)
    /// - `CONTENT_API_URL`: content API base URL (default: derived from stage)
    /// - `CONTENT_API_DOMAIN`: domain used to derive the URL (default: api.content.local)
    /// - `CONTENT_API_KEY`: key sent with server-token requests
    /// - `CONTENT_API_IDENTITY`: identity used for content reads (default: anonymous)
    /// - `CONTENT_API_TOKEN_CACHE`: cache tokens per site (default: false)
    /// - `SUGGEST_SKIP_WORDS`: comma-separated skip words for video suggestions
    /// - `KAFKA_BROKER`: Kafka broker address (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: content-search-indexer)
    /// - `CHANGE_EVENTS_TOPIC`: change-stream topic (default: content.changes)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Read settings from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, IndexingError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let search_api_version = parse_or(
            get("SEARCH_API_VERSION"),
            "SEARCH_API_VERSION",
            MIN_SEARCH_API_VERSION,
        )?;
        if search_api_version < MIN_SEARCH_API_VERSION {
            return Err(IndexingError::config(format!(
                "SEARCH_API_VERSION {} is not supported; typeless writes need {} or later",
                search_api_version, MIN_SEARCH_API_VERSION
            )));
        }

        let layout = match get("INDEX_LAYOUT") {
            Some(raw) => IndexLayout::from_str(raw).map_err(IndexingError::config)?,
            None => IndexLayout::default(),
        };
        let defaults = IndexSettings::default();
        let gateway = IndexGatewayConfig {
            layout,
            settings: IndexSettings {
                number_of_shards: parse_or(
                    get("INDEX_SHARDS"),
                    "INDEX_SHARDS",
                    defaults.number_of_shards,
                )?,
                number_of_replicas: parse_or(
                    get("INDEX_REPLICAS"),
                    "INDEX_REPLICAS",
                    defaults.number_of_replicas,
                )?,
            },
        };

        let stage = get("STAGE").unwrap_or(DEFAULT_STAGE).to_lowercase();
        let mut content_api = match get("CONTENT_API_URL") {
            Some(url) => ContentApiConfig::new(url),
            None => ContentApiConfig::for_stage(
                &stage,
                get("CONTENT_API_DOMAIN").unwrap_or(DEFAULT_CONTENT_API_DOMAIN),
            ),
        };
        if let Some(api_key) = get("CONTENT_API_KEY") {
            content_api = content_api.with_api_key(api_key);
        }
        if let Some(identity) = get("CONTENT_API_IDENTITY") {
            content_api = content_api
                .with_read_identity(Identity::from_str(identity).map_err(IndexingError::config)?);
        }
        content_api = content_api.with_token_cache(parse_or(
            get("CONTENT_API_TOKEN_CACHE"),
            "CONTENT_API_TOKEN_CACHE",
            false,
        )?);

        Ok(Self {
            opensearch_url: get("OPENSEARCH_URL")
                .unwrap_or(DEFAULT_OPENSEARCH_URL)
                .to_string(),
            search_api_version,
            connection_mode: ConnectionMode::parse(get("OPENSEARCH_CONNECTION_MODE")),
            retry_interval_secs: parse_or(
                get("OPENSEARCH_RETRY_INTERVAL_SECS"),
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )?,
            gateway,
            stage,
            content_api,
            skip_words: get("SUGGEST_SKIP_WORDS").map(parse_skip_words).unwrap_or_default(),
            kafka_broker: get("KAFKA_BROKER").unwrap_or(DEFAULT_KAFKA_BROKER).to_string(),
            kafka_group_id: get("KAFKA_GROUP_ID")
                .unwrap_or(DEFAULT_KAFKA_GROUP_ID)
                .to_string(),
            change_events_topic: get("CHANGE_EVENTS_TOPIC")
                .unwrap_or(DEFAULT_CHANGE_EVENTS_TOPIC)
                .to_string(),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<&str>, name: &str, default: T) -> Result<T, IndexingError> {
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| IndexingError::config(format!("Invalid {}: {}", name, raw))),
        None => Ok(default),
    }
}
