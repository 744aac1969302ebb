//! Photo transformer.

use search_indexer_shared::{ContentType, IndexDocument, PhotoDocument};
use serde_json::Value;

use super::{author, ContentTransformer};
use crate::processor::fields;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoTransformer;

impl ContentTransformer for PhotoTransformer {
    fn content_type(&self) -> ContentType {
        ContentType::Photo
    }

    fn build_document(&self, record: Value) -> IndexDocument {
        IndexDocument::Photo(PhotoDocument {
            title: fields::text(&record, "/gist/title"),
            description: fields::text(&record, "/gist/description"),
            author: author(&record),
            primary_category: fields::extract_optional_title(
                record.pointer("/gist/primaryCategory"),
            ),
            categories: fields::flatten_categories(record.get("categories")),
            tags: fields::flatten_tags(record.get("tags")),
            published_date: fields::first_text(&record, &["/gist/publishDate", "/publishedDate"]),
            data: record,
        })
    }
}
