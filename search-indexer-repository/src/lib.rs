//! # Search Indexer Repository
//!
//! This crate provides the index gateway used by the content search indexer: a
//! `SearchIndexProvider` trait over the search engine's primitives, a concrete
//! OpenSearch implementation, an in-memory provider for tests and local runs, and
//! the `IndexGateway` that layers per-site index naming, create-on-demand and
//! idempotent upsert/delete on top.

pub mod config;
pub mod errors;
pub mod gateway;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod types;
pub mod utils;

pub use config::{IndexGatewayConfig, IndexLayout, IndexSettings};
pub use errors::SearchIndexError;
pub use gateway::IndexGateway;
pub use interfaces::SearchIndexProvider;
pub use memory::{MemorySearchProvider, ProviderCall};
pub use opensearch::OpenSearchProvider;
pub use types::{DeleteDocumentRequest, IndexDocumentRequest};
pub use utils::{index_name, validate_index_name};
