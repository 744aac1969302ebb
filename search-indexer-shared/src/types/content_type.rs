//! Content-type discriminator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The content families indexed by the search indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Series,
    Article,
    Event,
    Audio,
    Photo,
}

impl ContentType {
    /// Every content type, in registration order.
    pub const ALL: [ContentType; 6] = [
        ContentType::Video,
        ContentType::Series,
        ContentType::Article,
        ContentType::Event,
        ContentType::Audio,
        ContentType::Photo,
    ];

    /// The discriminator string written to the document's `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Series => "series",
            ContentType::Article => "article",
            ContentType::Event => "event",
            ContentType::Audio => "audio",
            ContentType::Photo => "photo",
        }
    }

    /// Map a record discriminator value (case-insensitive) to a content type.
    pub fn from_discriminator(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|content_type| content_type.as_str().eq_ignore_ascii_case(value))
    }

    /// The index bucket this type is grouped into when indexes are split per type.
    ///
    /// Series share the video bucket.
    pub fn bucket(&self) -> &'static str {
        match self {
            ContentType::Video | ContentType::Series => "videos",
            ContentType::Article => "articles",
            ContentType::Event => "events",
            ContentType::Audio => "audio",
            ContentType::Photo => "photos",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_discriminator(s).ok_or_else(|| format!("unknown content type: {}", s))
    }
}
