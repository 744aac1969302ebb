//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, plus the index templates it creates.

mod index_config;
mod provider;

pub use index_config::{content_type_properties, get_index_template};
pub use provider::OpenSearchProvider;
