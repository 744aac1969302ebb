//! Dependency initialization and wiring for the search indexer.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{ConnectionMode, IndexerSettings};
use crate::consumer::KafkaConsumer;
use crate::handler::BatchHandler;
use crate::orchestrator::Orchestrator;
use crate::processor::{EventRouter, TransformerRegistry};
use crate::IndexingError;
use content_api::ContentSource;
use search_indexer_repository::{IndexGateway, OpenSearchProvider, SearchIndexError};
use search_indexer_shared::ContentType;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`IndexerSettings::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the settings are invalid or a connection fails
    ///   in fail-fast mode
    pub async fn new() -> Result<Self, IndexingError> {
        Self::from_settings(IndexerSettings::from_env()?).await
    }

    /// Wire the indexer from already-parsed settings.
    pub async fn from_settings(settings: IndexerSettings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            search_api_version = settings.search_api_version,
            index_layout = %settings.gateway.layout,
            stage = %settings.stage,
            content_api_url = %settings.content_api.base_url,
            kafka_broker = %settings.kafka_broker,
            kafka_group_id = %settings.kafka_group_id,
            topic = %settings.change_events_topic,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval_secs,
            "Initializing dependencies"
        );

        let search_provider = Self::connect_to_opensearch(
            &settings.opensearch_url,
            settings.connection_mode,
            Duration::from_secs(settings.retry_interval_secs),
        )
        .await?;

        info!("OpenSearch connection established");

        // Indexes are created per site on first write, nothing to ensure up front
        let gateway = IndexGateway::new(
            Arc::new(search_provider),
            settings.gateway.clone(),
            ContentType::Video,
        );

        let fetcher = ContentSource::live(settings.content_api.clone()).into_fetcher();
        let registry = TransformerRegistry::standard(fetcher, &gateway, settings.skip_words.clone());
        info!(pipelines = registry.len(), "Content pipelines registered");

        let router = EventRouter::new(registry).with_stage(settings.stage.as_str());
        let handler = BatchHandler::new(router);

        let consumer = KafkaConsumer::new(
            &settings.kafka_broker,
            &settings.kafka_group_id,
            &settings.change_events_topic,
        )
        .map_err(|e| IndexingError::config(format!("Failed to create Kafka consumer: {}", e)))?;

        info!("Kafka consumer created");

        let orchestrator = Orchestrator::new(Arc::new(consumer), handler);

        Ok(Self { orchestrator })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, IndexingError> {
        loop {
            match Self::try_connect_opensearch(url).await {
                Ok(provider) => return Ok(provider),
                Err(SearchIndexError::ValidationError(e)) => {
                    return Err(IndexingError::config(format!("Invalid OPENSEARCH_URL: {}", e)));
                }
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(IndexingError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Build the provider and wait for the cluster to answer a ping.
    async fn try_connect_opensearch(url: &str) -> Result<OpenSearchProvider, SearchIndexError> {
        let provider = OpenSearchProvider::new(url).await?;
        provider.ping().await?;
        Ok(provider)
    }
}
