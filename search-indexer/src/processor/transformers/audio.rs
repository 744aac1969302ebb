//! Audio transformer.

use search_indexer_shared::{AudioDocument, ContentType, IndexDocument};
use serde_json::Value;

use super::{author, ContentTransformer};
use crate::processor::fields;

/// Top-level fields that locate the audio stream.
const STREAMING_FIELDS: [&str; 2] = ["streamingInfo", "audioAssets"];

/// Builds audio documents. Streaming locations never reach the index.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioTransformer;

impl AudioTransformer {
    fn strip_streaming_fields(mut record: Value) -> Value {
        if let Some(map) = record.as_object_mut() {
            for field in STREAMING_FIELDS {
                map.remove(field);
            }
        }
        if let Some(gist) = record.get_mut("gist").and_then(Value::as_object_mut) {
            gist.remove("audioUrl");
        }
        record
    }
}

impl ContentTransformer for AudioTransformer {
    fn content_type(&self) -> ContentType {
        ContentType::Audio
    }

    fn build_document(&self, record: Value) -> IndexDocument {
        IndexDocument::Audio(AudioDocument {
            title: fields::text(&record, "/gist/title"),
            description: fields::text(&record, "/gist/description"),
            author: author(&record),
            primary_category: fields::extract_optional_title(
                record.pointer("/gist/primaryCategory"),
            ),
            categories: fields::flatten_categories(record.get("categories")),
            tags: fields::flatten_tags(record.get("tags")),
            data: Self::strip_streaming_fields(record),
        })
    }
}
