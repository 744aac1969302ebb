//! Error types for the search indexer ingest.

use content_api::ContentApiError;
use search_indexer_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur in the search indexer ingest.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// Error parsing or decoding data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// At least one event of a batch failed.
    #[error("{failed} of {total} events failed")]
    BatchFailed { failed: usize, total: usize },

    /// The consumer stopped after a batch was rejected, leaving it uncommitted.
    #[error("Batch rejected: {0}")]
    BatchRejected(String),
}

impl IngestError {
    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}

/// Failure of a single event's pipeline.
///
/// These never abort a batch on their own; the router turns them into values
/// and the tracker counts them.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The record has neither image, or its site/id cannot be determined.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The authoritative record could not be fetched.
    #[error("Document build error: {0}")]
    DocumentBuild(#[from] ContentApiError),

    /// The search engine rejected the write or delete.
    #[error("Index error: {0}")]
    Index(#[from] SearchIndexError),
}

impl PipelineError {
    /// Create a malformed event error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEvent(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failed_names_failure_count() {
        let err = IngestError::BatchFailed {
            failed: 1,
            total: 2,
        };
        assert_eq!(err.to_string(), "1 of 2 events failed");
    }

    #[test]
    fn test_pipeline_error_conversions() {
        let err: PipelineError = ContentApiError::token("denied").into();
        assert!(matches!(err, PipelineError::DocumentBuild(_)));

        let err: PipelineError = SearchIndexError::index_write("rejected").into();
        assert!(matches!(err, PipelineError::Index(_)));
    }
}
