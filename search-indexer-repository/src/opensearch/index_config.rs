//! OpenSearch index templates.
//!
//! This module defines the settings and mappings used when a site index is
//! created on demand. A template covers one or more content types; under the
//! shared layout a site index holds every type, under the bucket layout it holds
//! only the types of one bucket.

use search_indexer_shared::ContentType;
use serde_json::{json, Map, Value};

use crate::config::IndexSettings;

/// Maximum edge n-gram length for autocomplete fields.
const AUTOCOMPLETE_MAX_GRAM: u32 = 20;

/// Build the index settings and mappings for the given content types.
///
/// The template includes:
/// - **autocomplete**: edge n-gram analyzer used at index time for text fields
/// - **autocomplete_search**: lowercase analyzer used at query time
/// - **keyword_lowercase**: case-insensitive exact matching (`exact` sub-fields)
/// - **type**: keyword discriminator shared by all documents
/// - **data**: the raw source record, stored but not indexed
///
/// # Arguments
///
/// * `settings` - Shard and replica counts
/// * `content_types` - The content types whose fields the index must map
pub fn get_index_template(settings: &IndexSettings, content_types: &[ContentType]) -> Value {
    let mut properties = Map::new();
    properties.insert("type".to_string(), json!({ "type": "keyword" }));
    properties.insert(
        "data".to_string(),
        json!({ "type": "object", "enabled": false }),
    );
    for content_type in content_types {
        properties.extend(content_type_properties(*content_type));
    }

    json!({
        "settings": {
            "number_of_shards": settings.number_of_shards,
            "number_of_replicas": settings.number_of_replicas,
            "analysis": {
                "filter": {
                    "autocomplete_filter": {
                        "type": "edge_ngram",
                        "min_gram": 1,
                        "max_gram": AUTOCOMPLETE_MAX_GRAM
                    }
                },
                "analyzer": {
                    "autocomplete": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "autocomplete_filter"]
                    },
                    "autocomplete_search": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase"]
                    },
                    "keyword_lowercase": {
                        "type": "custom",
                        "tokenizer": "keyword",
                        "filter": ["lowercase"]
                    }
                }
            }
        },
        "mappings": {
            "properties": properties
        }
    })
}

/// Field mappings contributed by one content type.
pub fn content_type_properties(content_type: ContentType) -> Map<String, Value> {
    let prefix = content_type.as_str();
    let mut properties = Map::new();

    properties.insert(format!("{}Title", prefix), text_field());
    properties.insert(format!("{}Description", prefix), text_field());
    properties.insert(format!("{}PrimaryCategory", prefix), text_field());
    properties.insert(format!("{}Categories", prefix), name_list_field());
    properties.insert(format!("{}Tags", prefix), name_list_field());

    match content_type {
        ContentType::Video => {
            properties.insert(format!("{}People", prefix), name_list_field());
            properties.insert(
                "videoSuggest".to_string(),
                json!({ "type": "completion", "analyzer": "keyword_lowercase" }),
            );
            properties.insert("status".to_string(), json!({ "type": "keyword" }));
            properties.insert("isTrailer".to_string(), json!({ "type": "boolean" }));
            properties.insert("free".to_string(), json!({ "type": "boolean" }));
            properties.insert("year".to_string(), json!({ "type": "integer" }));
            properties.insert("parentalRating".to_string(), json!({ "type": "keyword" }));
        }
        ContentType::Series => {
            properties.insert(format!("{}People", prefix), name_list_field());
            properties.insert("status".to_string(), json!({ "type": "keyword" }));
        }
        ContentType::Article | ContentType::Audio => {
            properties.insert(format!("{}Author", prefix), text_field());
        }
        ContentType::Photo => {
            properties.insert(format!("{}Author", prefix), text_field());
            properties.insert("publishedDate".to_string(), json!({ "type": "keyword" }));
        }
        ContentType::Event => {
            properties.insert("eventVenue".to_string(), text_field());
            properties.insert("eventTime".to_string(), json!({ "type": "keyword" }));
            properties.insert("eventDate".to_string(), json!({ "type": "keyword" }));
        }
    }

    properties
}

fn text_field() -> Value {
    json!({
        "type": "text",
        "analyzer": "autocomplete",
        "search_analyzer": "autocomplete_search",
        "fields": {
            "raw": { "type": "keyword" },
            "exact": { "type": "text", "analyzer": "keyword_lowercase" }
        }
    })
}

fn name_list_field() -> Value {
    json!({
        "properties": {
            "name": text_field()
        }
    })
}
