//! Kafka consumer implementation for the search indexer.
//!
//! Consumes change records from the change-stream topic and forwards them to
//! the ingest in batches. Offsets are committed only after the orchestrator
//! acknowledges a batch, and never past a batch that is still in flight. A
//! rejected batch stops the consumer so the restart re-reads it.

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer as RdConsumer, StreamConsumer},
    message::{BorrowedMessage, Message as KafkaMessage},
    Offset, TopicPartitionList,
};
use search_indexer_shared::ChangeRecord;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument};

use crate::consumer::messages::{ChangePayload, MessageOffset, StreamMessage};
use crate::consumer::offsets::OffsetTracker;
use crate::errors::IngestError;
use crate::orchestrator::Consumer;

/// Default change-stream topic.
pub const DEFAULT_CHANGE_EVENTS_TOPIC: &str = "content.changes";

/// Default batch size for Kafka message batching.
const DEFAULT_BATCH_SIZE: usize = 50;

/// Default batch timeout in milliseconds.
const DEFAULT_BATCH_TIMEOUT_MS: u64 = 1000;

/// Kafka consumer for change records.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topics: Vec<String>,
    batch_size: usize,
    batch_timeout: Duration,
}

impl KafkaConsumer {
    /// Create a new Kafka consumer reading `topic`.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Kafka broker addresses (comma-separated)
    /// * `group_id` - Consumer group ID
    /// * `topic` - Change-stream topic
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self, IngestError> {
        Self::with_batch_config(
            brokers,
            group_id,
            topic,
            DEFAULT_BATCH_SIZE,
            DEFAULT_BATCH_TIMEOUT_MS,
        )
    }

    /// Create a new Kafka consumer with custom batch configuration.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Number of messages to batch before sending
    /// * `batch_timeout_ms` - Maximum time to wait before flushing a partial batch (milliseconds)
    pub fn with_batch_config(
        brokers: &str,
        group_id: &str,
        topic: &str,
        batch_size: usize,
        batch_timeout_ms: u64,
    ) -> Result<Self, IngestError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()?;

        info!(
            brokers = %brokers,
            group_id = %group_id,
            topic = %topic,
            batch_size = batch_size,
            batch_timeout_ms = batch_timeout_ms,
            "Created Kafka consumer with batching"
        );

        Ok(Self {
            consumer,
            topics: vec![topic.to_string()],
            batch_size,
            batch_timeout: Duration::from_millis(batch_timeout_ms),
        })
    }

    /// Send the pending batch to the orchestrator.
    async fn flush_batch(
        &self,
        records: &mut Vec<ChangeRecord>,
        offsets: &mut Vec<MessageOffset>,
        sender: &mpsc::Sender<StreamMessage>,
    ) -> Result<(), IngestError> {
        if offsets.is_empty() {
            return Ok(());
        }

        info!(
            record_count = records.len(),
            offset_count = offsets.len(),
            "Sending batch of change records to processor"
        );
        sender
            .send(StreamMessage::Records {
                records: std::mem::take(records),
                offsets: std::mem::take(offsets),
            })
            .await
            .map_err(|e| IngestError::ChannelError(e.to_string()))
    }

    /// Commit every partition watermark the tracker can release.
    fn commit_ready(&self, tracker: &mut OffsetTracker) -> Result<(), IngestError> {
        let ready = tracker.committable();
        if ready.is_empty() {
            return Ok(());
        }

        let mut tpl = TopicPartitionList::new();
        for (topic, partition, next_offset) in &ready {
            tpl.add_partition_offset(topic, *partition, Offset::Offset(*next_offset))?;
        }

        self.consumer.commit(&tpl, CommitMode::Async)?;
        debug!(partitions = ready.len(), "Committed offsets");
        Ok(())
    }

    /// Decode a message payload into change records.
    ///
    /// Returns `Ok(None)` for messages that carry no records.
    fn parse_message(msg: &BorrowedMessage<'_>) -> Result<Option<Vec<ChangeRecord>>, IngestError> {
        let payload = match msg.payload() {
            Some(p) if !p.is_empty() => p,
            _ => {
                debug!("Received message with empty payload");
                return Ok(None);
            }
        };

        let records = serde_json::from_slice::<ChangePayload>(payload)
            .map_err(|e| IngestError::parse(format!("Failed to decode change record: {}", e)))?
            .into_records();

        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(records))
    }
}

#[async_trait]
impl Consumer for KafkaConsumer {
    /// Subscribe to configured topics.
    fn subscribe(&self) -> Result<(), IngestError> {
        let topics: Vec<&str> = self.topics.iter().map(|s| s.as_str()).collect();
        self.consumer.subscribe(&topics)?;

        info!(topics = ?self.topics, "Subscribed to Kafka topics");
        Ok(())
    }

    /// Start consuming messages and send them through the channel.
    ///
    /// Messages are batched by size and timeout. Offsets are committed when the
    /// orchestrator acknowledges a batch as successful. A failed batch pins its
    /// partitions and ends the run with [`IngestError::BatchRejected`], so the
    /// batch is redelivered after a restart.
    #[instrument(skip(self, sender, ack_receiver, shutdown))]
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut ack_receiver: mpsc::Receiver<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        use futures::StreamExt;

        let mut message_stream = self.consumer.stream();
        let mut records: Vec<ChangeRecord> = Vec::new();
        let mut pending_offsets: Vec<MessageOffset> = Vec::with_capacity(self.batch_size);
        let mut tracker = OffsetTracker::new();
        let mut flush_timer = tokio::time::interval(self.batch_timeout);
        flush_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // Skip the first tick immediately
        flush_timer.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    // Pending records are uncommitted and will be re-read on restart
                    let _ = sender.send(StreamMessage::End).await;
                    break;
                }
                ack_msg = ack_receiver.recv() => {
                    match ack_msg {
                        Some(StreamMessage::Acknowledgment { offsets, success, error }) => {
                            if success {
                                tracker.complete(&offsets);
                                if let Err(e) = self.commit_ready(&mut tracker) {
                                    error!(error = %e, "Failed to commit offsets after acknowledgment");
                                }
                            } else {
                                tracker.fail(&offsets);
                                let reason = error.unwrap_or_else(|| "Unknown error".to_string());
                                error!(
                                    offset_count = offsets.len(),
                                    error = %reason,
                                    "Batch rejected, stopping consumer so it is redelivered"
                                );
                                return Err(IngestError::BatchRejected(reason));
                            }
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Acknowledgment channel closed");
                            break;
                        }
                        _ => {}
                    }
                }
                message = message_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            debug!(
                                topic = %msg.topic(),
                                partition = msg.partition(),
                                offset = msg.offset(),
                                "Received message from Kafka"
                            );
                            let offset = (msg.topic().to_string(), msg.partition(), msg.offset());
                            tracker.track(&offset);
                            match Self::parse_message(&msg) {
                                Ok(Some(parsed)) => {
                                    records.extend(parsed);
                                    pending_offsets.push(offset);

                                    if pending_offsets.len() >= self.batch_size {
                                        self.flush_batch(&mut records, &mut pending_offsets, &sender).await?;
                                    }
                                }
                                Ok(None) => {
                                    // Nothing to process; settled as soon as earlier batches are
                                    tracker.complete(&[offset]);
                                    self.commit_ready(&mut tracker)?;
                                }
                                Err(e) => {
                                    // Redelivery can't fix a payload that doesn't decode
                                    error!(
                                        topic = %msg.topic(),
                                        partition = msg.partition(),
                                        offset = msg.offset(),
                                        error = %e,
                                        "Failed to parse message, skipping"
                                    );
                                    tracker.complete(&[offset]);
                                    self.commit_ready(&mut tracker)?;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka error");
                            let _ = sender.send(StreamMessage::Error(e.to_string())).await;
                        }
                        None => {
                            info!("Kafka stream ended");
                            self.flush_batch(&mut records, &mut pending_offsets, &sender).await?;
                            let _ = sender.send(StreamMessage::End).await;
                            break;
                        }
                    }
                }
                _ = flush_timer.tick() => {
                    if !pending_offsets.is_empty() {
                        debug!(count = pending_offsets.len(), "Flushing batch due to timeout");
                        self.flush_batch(&mut records, &mut pending_offsets, &sender).await?;
                    }
                }
            }
        }

        Ok(())
    }
}
