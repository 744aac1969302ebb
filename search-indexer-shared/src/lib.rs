//! # Search Indexer Shared
//!
//! This crate defines shared data structures used across the content search indexer.
//! It includes the change-record wire format delivered by the change stream, helpers
//! for reading wrapped attribute values, the content-type discriminator, and the
//! index documents written to the search engine.

pub mod types;

pub use types::attribute_value::{attribute_str, image_str, unmarshal_image, unmarshal_value};
pub use types::change_record::{ChangeAction, ChangeEvent, ChangeRecord, Image, StreamRecord};
pub use types::content_type::ContentType;
pub use types::index_document::{
    ArticleDocument, AudioDocument, EventDocument, IndexDocument, NamedTerm, PhotoDocument,
    SeriesDocument, VideoDocument,
};
