//! Loader module for the search indexer ingest.
//!
//! A [`ContentPipeline`] runs one change event end to end: obtain the record
//! (from the content API or the event image), build the document, and apply it
//! to the search index through the pipeline's own [`IndexGateway`] handle.

use std::sync::Arc;

use content_api::ContentFetcher;
use search_indexer_repository::IndexGateway;
use search_indexer_shared::{unmarshal_image, ChangeAction, ChangeEvent, ContentType};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::processor::{ContentTransformer, SourceMode};

/// What a pipeline did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The document was written or replaced.
    Indexed,
    /// The document was deleted.
    Deleted,
    /// A remove found nothing to delete.
    AlreadyAbsent,
}

/// Fetch → transform → write for one content type.
pub struct ContentPipeline {
    transformer: Arc<dyn ContentTransformer>,
    source_mode: SourceMode,
    fetcher: Arc<dyn ContentFetcher>,
    gateway: IndexGateway,
}

impl ContentPipeline {
    /// Create a pipeline. The gateway is rebound to the transformer's content type.
    pub fn new(
        transformer: Arc<dyn ContentTransformer>,
        source_mode: SourceMode,
        fetcher: Arc<dyn ContentFetcher>,
        gateway: &IndexGateway,
    ) -> Self {
        let gateway = gateway.for_content_type(transformer.content_type());
        Self {
            transformer,
            source_mode,
            fetcher,
            gateway,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.transformer.content_type()
    }

    pub fn source_mode(&self) -> SourceMode {
        self.source_mode
    }

    /// Run the pipeline for one routed event.
    ///
    /// Steps are strictly sequential; nothing is retried.
    #[instrument(
        skip(self, event),
        fields(
            content_type = %self.content_type(),
            site = %event.site,
            content_id = %event.content_id,
        )
    )]
    pub async fn run(&self, event: &ChangeEvent) -> Result<PipelineOutcome, PipelineError> {
        match event.action {
            ChangeAction::Upsert => {
                let record = self.load_record(event).await?;
                let document = self.transformer.build_document(record);
                self.gateway
                    .upsert(&event.site, &event.content_id, &document)
                    .await?;
                debug!("Indexed document");
                Ok(PipelineOutcome::Indexed)
            }
            ChangeAction::Remove => {
                if self.gateway.delete(&event.site, &event.content_id).await? {
                    Ok(PipelineOutcome::Deleted)
                } else {
                    Ok(PipelineOutcome::AlreadyAbsent)
                }
            }
        }
    }

    async fn load_record(&self, event: &ChangeEvent) -> Result<Value, PipelineError> {
        match self.source_mode {
            SourceMode::Api => Ok(self
                .fetcher
                .fetch_content(self.content_type(), &event.site, &event.content_id)
                .await?),
            SourceMode::EventImage => event
                .active_image()
                .map(unmarshal_image)
                .ok_or_else(|| PipelineError::malformed("event has no image to index")),
        }
    }
}
