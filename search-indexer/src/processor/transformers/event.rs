//! Event transformer.

use search_indexer_shared::{ContentType, EventDocument, IndexDocument};
use serde_json::Value;

use super::ContentTransformer;
use crate::processor::fields;

/// Builds event documents. Venue, time and date come from the first schedule entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTransformer;

impl ContentTransformer for EventTransformer {
    fn content_type(&self) -> ContentType {
        ContentType::Event
    }

    fn build_document(&self, record: Value) -> IndexDocument {
        let schedule = record
            .get("schedule")
            .and_then(Value::as_array)
            .and_then(|entries| entries.first());

        IndexDocument::Event(EventDocument {
            title: fields::text(&record, "/gist/title"),
            description: fields::text(&record, "/gist/description"),
            primary_category: fields::extract_optional_title(
                record.pointer("/gist/primaryCategory"),
            ),
            categories: fields::flatten_categories(record.get("categories")),
            tags: fields::flatten_tags(record.get("tags")),
            venue: schedule.and_then(|entry| fields::extract_optional_title(entry.get("venue"))),
            time: schedule.and_then(|entry| entry.get("time").and_then(fields::scalar_string)),
            date: schedule.and_then(|entry| entry.get("date").and_then(fields::scalar_string)),
            data: record,
        })
    }
}
