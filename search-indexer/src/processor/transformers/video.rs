//! Video transformer.

use search_indexer_shared::{ContentType, IndexDocument, VideoDocument};
use serde_json::Value;

use super::ContentTransformer;
use crate::processor::fields;

/// Builds video documents from content API video records.
#[derive(Debug, Clone, Default)]
pub struct VideoTransformer {
    skip_words: Vec<String>,
}

impl VideoTransformer {
    pub fn new(skip_words: Vec<String>) -> Self {
        Self { skip_words }
    }
}

impl ContentTransformer for VideoTransformer {
    fn content_type(&self) -> ContentType {
        ContentType::Video
    }

    fn build_document(&self, record: Value) -> IndexDocument {
        let title = fields::text(&record, "/gist/title");
        let suggest = fields::suggestions(title.as_deref(), &self.skip_words);

        IndexDocument::Video(VideoDocument {
            suggest,
            title,
            description: fields::text(&record, "/gist/description"),
            primary_category: fields::extract_optional_title(
                record.pointer("/gist/primaryCategory"),
            ),
            categories: fields::flatten_categories(record.get("categories")),
            tags: fields::flatten_tags(record.get("tags")),
            people: fields::flatten_people(record.get("creditBlocks")),
            status: fields::first_text(&record, &["/contentDetails/status", "/status"]),
            is_trailer: fields::flag(&record, "/gist/isTrailer").unwrap_or(false),
            free: fields::flag(&record, "/gist/free"),
            year: fields::integer(&record, "/gist/year"),
            parental_rating: fields::first_text(
                &record,
                &["/parentalRating", "/gist/parentalRating"],
            ),
            data: record,
        })
    }
}
