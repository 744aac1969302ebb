//! Index document types for the search index.
//!
//! This module defines the documents stored in the search engine. Every document
//! is tagged with a `type` discriminator and carries type-prefixed searchable
//! fields, so several content types can share one index without field clashes.
//!
//! Absent values are serialized as `null` rather than omitted, which keeps the
//! document shape stable for the index mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::content_type::ContentType;

/// A flattened classification term (category, tag or credited person).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedTerm {
    pub name: String,
}

impl NamedTerm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Document representation for the search index.
///
/// Serializes as a flat object whose `type` field names the content type, e.g.
/// `{"type": "video", "videoTitle": "...", ...}`. The document id is the content
/// id and is not part of the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IndexDocument {
    Video(VideoDocument),
    Series(SeriesDocument),
    Article(ArticleDocument),
    Event(EventDocument),
    Audio(AudioDocument),
    Photo(PhotoDocument),
}

impl IndexDocument {
    /// The content type this document was built for.
    pub fn content_type(&self) -> ContentType {
        match self {
            IndexDocument::Video(_) => ContentType::Video,
            IndexDocument::Series(_) => ContentType::Series,
            IndexDocument::Article(_) => ContentType::Article,
            IndexDocument::Event(_) => ContentType::Event,
            IndexDocument::Audio(_) => ContentType::Audio,
            IndexDocument::Photo(_) => ContentType::Photo,
        }
    }
}

/// Video document.
///
/// # Fields
///
/// - `videoTitle`, `videoDescription`, `videoPrimaryCategory`: gist text fields
/// - `videoCategories`, `videoTags`, `videoPeople`: `{name}` arrays or `null`
/// - `videoSuggest`: suggestion inputs generated from the title
/// - `status`, `isTrailer`, `free`, `year`, `parentalRating`: filter fields
/// - `data`: the full source record, not indexed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoDocument {
    #[serde(rename = "videoTitle")]
    pub title: Option<String>,
    #[serde(rename = "videoDescription")]
    pub description: Option<String>,
    #[serde(rename = "videoPrimaryCategory")]
    pub primary_category: Option<String>,
    #[serde(rename = "videoCategories")]
    pub categories: Option<Vec<NamedTerm>>,
    #[serde(rename = "videoTags")]
    pub tags: Option<Vec<NamedTerm>>,
    #[serde(rename = "videoPeople")]
    pub people: Option<Vec<NamedTerm>>,
    #[serde(rename = "videoSuggest")]
    pub suggest: Option<Vec<String>>,
    pub status: Option<String>,
    #[serde(rename = "isTrailer", default)]
    pub is_trailer: bool,
    pub free: Option<bool>,
    pub year: Option<i64>,
    #[serde(rename = "parentalRating")]
    pub parental_rating: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Series document, built from the change-stream image rather than the content API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeriesDocument {
    #[serde(rename = "seriesTitle")]
    pub title: Option<String>,
    #[serde(rename = "seriesDescription")]
    pub description: Option<String>,
    #[serde(rename = "seriesPrimaryCategory")]
    pub primary_category: Option<String>,
    #[serde(rename = "seriesCategories")]
    pub categories: Option<Vec<NamedTerm>>,
    #[serde(rename = "seriesTags")]
    pub tags: Option<Vec<NamedTerm>>,
    #[serde(rename = "seriesPeople")]
    pub people: Option<Vec<NamedTerm>>,
    pub status: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Article document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArticleDocument {
    #[serde(rename = "articleTitle")]
    pub title: Option<String>,
    #[serde(rename = "articleDescription")]
    pub description: Option<String>,
    #[serde(rename = "articleAuthor")]
    pub author: Option<String>,
    #[serde(rename = "articlePrimaryCategory")]
    pub primary_category: Option<String>,
    #[serde(rename = "articleCategories")]
    pub categories: Option<Vec<NamedTerm>>,
    #[serde(rename = "articleTags")]
    pub tags: Option<Vec<NamedTerm>>,
    #[serde(default)]
    pub data: Value,
}

/// Event document. Schedule fields come from the first schedule entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventDocument {
    #[serde(rename = "eventTitle")]
    pub title: Option<String>,
    #[serde(rename = "eventDescription")]
    pub description: Option<String>,
    #[serde(rename = "eventPrimaryCategory")]
    pub primary_category: Option<String>,
    #[serde(rename = "eventCategories")]
    pub categories: Option<Vec<NamedTerm>>,
    #[serde(rename = "eventTags")]
    pub tags: Option<Vec<NamedTerm>>,
    #[serde(rename = "eventVenue")]
    pub venue: Option<String>,
    #[serde(rename = "eventTime")]
    pub time: Option<String>,
    #[serde(rename = "eventDate")]
    pub date: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Audio document. `data` never contains streaming locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioDocument {
    #[serde(rename = "audioTitle")]
    pub title: Option<String>,
    #[serde(rename = "audioDescription")]
    pub description: Option<String>,
    #[serde(rename = "audioAuthor")]
    pub author: Option<String>,
    #[serde(rename = "audioPrimaryCategory")]
    pub primary_category: Option<String>,
    #[serde(rename = "audioCategories")]
    pub categories: Option<Vec<NamedTerm>>,
    #[serde(rename = "audioTags")]
    pub tags: Option<Vec<NamedTerm>>,
    #[serde(default)]
    pub data: Value,
}

/// Photo document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhotoDocument {
    #[serde(rename = "photoTitle")]
    pub title: Option<String>,
    #[serde(rename = "photoDescription")]
    pub description: Option<String>,
    #[serde(rename = "photoAuthor")]
    pub author: Option<String>,
    #[serde(rename = "photoPrimaryCategory")]
    pub primary_category: Option<String>,
    #[serde(rename = "photoCategories")]
    pub categories: Option<Vec<NamedTerm>>,
    #[serde(rename = "photoTags")]
    pub tags: Option<Vec<NamedTerm>>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub data: Value,
}
