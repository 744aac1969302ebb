//! Configuration and dependency wiring for the search indexer.

pub mod dependencies;
pub mod settings;

pub use dependencies::Dependencies;
pub use settings::{ConnectionMode, IndexerSettings};
