//! Consumer module for the search indexer ingest.
//!
//! Provides Kafka consumer functionality for receiving change records.

mod kafka_consumer;
mod messages;
mod offsets;

pub use kafka_consumer::{KafkaConsumer, DEFAULT_CHANGE_EVENTS_TOPIC};
pub use messages::{ChangePayload, MessageOffset, StreamMessage};
pub use offsets::OffsetTracker;
