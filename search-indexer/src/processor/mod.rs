//! Processor module for the search indexer ingest.
//!
//! Routes change records to content-type pipelines and transforms content
//! records into index documents.

pub mod fields;
mod registry;
mod router;
mod transformers;

pub use registry::{SourceMode, TransformerRegistry};
pub use router::{source_table, DispatchedBatch, EventRouter, Operation, Route, SkipReason};
pub use transformers::{
    ArticleTransformer, AudioTransformer, ContentTransformer, EventTransformer, PhotoTransformer,
    SeriesTransformer, VideoTransformer,
};
