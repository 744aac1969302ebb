//! # Search Indexer
//!
//! Content search indexer - consumes change records from the content and
//! series tables and keeps the per-site search indexes in step with them.
//!
//! ## Architecture
//!
//! Each batch of change records flows through:
//!
//! 1. **Consumer**: Receives change-record batches from Kafka
//! 2. **Processor**: Routes each record to the pipeline for its content type
//! 3. **Loader**: Fetches the record, builds the document and writes or deletes it
//! 4. **Tracker**: Waits for every event of the batch and reduces them to a verdict
//! 5. **Orchestrator**: Acknowledges successful batches and rejects failed ones
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`consumer`]: Kafka consumer for change records
//! - [`processor`]: Event router, transformer registry and document transformers
//! - [`loader`]: Per-content-type pipelines
//! - [`tracker`]: Batch completion tracking
//! - [`handler`]: Batch entrypoint
//! - [`orchestrator`]: Coordinates the ingest flow
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod errors;
pub mod handler;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod tracker;

pub use config::Dependencies;
pub use errors::{IngestError, PipelineError};
pub use handler::BatchHandler;
pub use tracker::BatchReport;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
