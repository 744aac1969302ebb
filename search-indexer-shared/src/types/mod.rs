//! This module defines the core data structures used across the search indexer.
//! It re-exports the change-record types, the content-type discriminator, and
//! the index document model.

pub mod attribute_value;
pub mod change_record;
pub mod content_type;
pub mod index_document;

pub use change_record::{ChangeAction, ChangeEvent, ChangeRecord, Image};
pub use content_type::ContentType;
pub use index_document::IndexDocument;
