//! Series transformer.
//!
//! Series are indexed straight from the change-event image; the record handed
//! in is the unmarshalled image, not a content API response.

use search_indexer_shared::{ContentType, IndexDocument, SeriesDocument};
use serde_json::Value;

use super::ContentTransformer;
use crate::processor::fields;

#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesTransformer;

impl ContentTransformer for SeriesTransformer {
    fn content_type(&self) -> ContentType {
        ContentType::Series
    }

    fn build_document(&self, record: Value) -> IndexDocument {
        IndexDocument::Series(SeriesDocument {
            title: fields::first_text(&record, &["/gist/title", "/title"]),
            description: fields::first_text(&record, &["/gist/description", "/description"]),
            primary_category: fields::extract_optional_title(
                record
                    .pointer("/gist/primaryCategory")
                    .or_else(|| record.get("primaryCategory")),
            ),
            categories: fields::flatten_categories(record.get("categories")),
            tags: fields::flatten_tags(record.get("tags")),
            people: fields::flatten_people(record.get("creditBlocks")),
            status: fields::text(&record, "/status"),
            data: record,
        })
    }
}
