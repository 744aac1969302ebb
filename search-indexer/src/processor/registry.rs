//! Content-type registry.

use std::collections::HashMap;
use std::sync::Arc;

use content_api::ContentFetcher;
use search_indexer_repository::IndexGateway;
use search_indexer_shared::ContentType;

use crate::loader::ContentPipeline;
use crate::processor::transformers::{
    ArticleTransformer, AudioTransformer, ContentTransformer, EventTransformer, PhotoTransformer,
    SeriesTransformer, VideoTransformer,
};

/// Where a pipeline gets the record it transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Fetch the authoritative record from the content API.
    Api,
    /// Use the change-event image as the record.
    EventImage,
}

/// Maps each content type to the pipeline that indexes it.
///
/// The router only dispatches to registered types; everything else is skipped.
#[derive(Default, Clone)]
pub struct TransformerRegistry {
    pipelines: HashMap<ContentType, Arc<ContentPipeline>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used in production: every content type, series from the
    /// event image and the rest from the content API.
    pub fn standard(
        fetcher: Arc<dyn ContentFetcher>,
        gateway: &IndexGateway,
        skip_words: Vec<String>,
    ) -> Self {
        let registrations: [(Arc<dyn ContentTransformer>, SourceMode); 6] = [
            (Arc::new(VideoTransformer::new(skip_words)), SourceMode::Api),
            (Arc::new(SeriesTransformer), SourceMode::EventImage),
            (Arc::new(ArticleTransformer), SourceMode::Api),
            (Arc::new(EventTransformer), SourceMode::Api),
            (Arc::new(AudioTransformer), SourceMode::Api),
            (Arc::new(PhotoTransformer), SourceMode::Api),
        ];

        let mut registry = Self::new();
        for (transformer, source_mode) in registrations {
            registry.register(ContentPipeline::new(
                transformer,
                source_mode,
                Arc::clone(&fetcher),
                gateway,
            ));
        }
        registry
    }

    /// Register a pipeline, replacing any previous one for its content type.
    pub fn register(&mut self, pipeline: ContentPipeline) {
        self.pipelines
            .insert(pipeline.content_type(), Arc::new(pipeline));
    }

    pub fn get(&self, content_type: ContentType) -> Option<Arc<ContentPipeline>> {
        self.pipelines.get(&content_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
