//! Content transformers.
//!
//! A transformer maps one authoritative content record into the index document
//! for its content type. Transformers are pure: fetching the record is the
//! pipeline's job, driven by the registration's [`SourceMode`](super::SourceMode).

mod article;
mod audio;
mod event;
mod photo;
mod series;
mod video;

pub use article::ArticleTransformer;
pub use audio::AudioTransformer;
pub use event::EventTransformer;
pub use photo::PhotoTransformer;
pub use series::SeriesTransformer;
pub use video::VideoTransformer;

use search_indexer_shared::{ContentType, IndexDocument};
use serde_json::Value;

use crate::processor::fields;

/// Builds the index document for one content type.
pub trait ContentTransformer: Send + Sync {
    /// The content type this transformer produces documents for.
    fn content_type(&self) -> ContentType;

    /// Build the document from the record. The record ends up under `data`.
    fn build_document(&self, record: Value) -> IndexDocument;
}

/// Author of an article, audio or photo record.
///
/// `gist.author`, then a top-level `author`, then the first entry of `authors`.
fn author(record: &Value) -> Option<String> {
    fields::extract_optional_title(record.pointer("/gist/author"))
        .or_else(|| fields::extract_optional_title(record.get("author")))
        .or_else(|| {
            fields::extract_optional_title(
                record
                    .get("authors")
                    .and_then(Value::as_array)
                    .and_then(|authors| authors.first()),
            )
        })
}
