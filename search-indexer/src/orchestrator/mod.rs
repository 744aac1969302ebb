//! Orchestrator module for the search indexer ingest.
//!
//! Coordinates the consumer and the batch handler, and turns batch verdicts
//! into acknowledgments.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration};
use tracing::{error, info, instrument, warn};

use crate::consumer::StreamMessage;
use crate::errors::IngestError;
use crate::handler::BatchHandler;

/// Interval between progress log lines.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Source of change-record batches.
///
/// Implementations push [`StreamMessage::Records`] into `sender` and react to
/// [`StreamMessage::Acknowledgment`]s arriving on `ack_receiver`.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Subscribe to the change stream.
    fn subscribe(&self) -> Result<(), IngestError>;

    /// Deliver batches until the stream ends or `shutdown` fires.
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        ack_receiver: mpsc::Receiver<StreamMessage>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError>;
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the message channel buffer.
    pub channel_buffer_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
        }
    }
}

/// Orchestrator that coordinates the ingest components.
///
/// The orchestrator:
/// - Runs the consumer in the background
/// - Hands every batch to the [`BatchHandler`]
/// - Acknowledges successful batches and rejects failed ones
/// - Handles shutdown signals
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    handler: BatchHandler,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    /// Total number of events processed since startup.
    total_events_processed: Arc<AtomicU64>,
    /// Total number of events that failed since startup.
    total_events_failed: Arc<AtomicU64>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: Arc<dyn Consumer>, handler: BatchHandler) -> Self {
        Self::with_config(consumer, handler, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        handler: BatchHandler,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            handler,
            config,
            shutdown_tx,
            total_events_processed: Arc::new(AtomicU64::new(0)),
            total_events_failed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Total events processed (succeeded or failed) since startup.
    pub fn events_processed(&self) -> u64 {
        self.total_events_processed.load(Ordering::Relaxed)
    }

    /// Total events that failed since startup.
    pub fn events_failed(&self) -> u64 {
        self.total_events_failed.load(Ordering::Relaxed)
    }

    /// Run the orchestrator.
    ///
    /// Blocks until the stream ends, a shutdown is requested, or the consumer
    /// cannot subscribe. A consumer that stops with an error (for example after
    /// a rejected batch) makes `run` return that error.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), IngestError> {
        info!("Starting search indexer orchestrator");

        self.consumer.subscribe()?;

        let (record_transmitter, mut record_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);
        let (ack_transmitter, ack_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);

        let consumer = Arc::clone(&self.consumer);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let mut shutdown_requested = self.shutdown_tx.subscribe();

        let consumer_handle = tokio::spawn(async move {
            let result = consumer
                .run(record_transmitter, ack_receiver, shutdown_rx)
                .await;
            if let Err(e) = &result {
                error!(error = %e, "Consumer error");
            }
            result
        });

        info!("Ready to process change records");

        let mut progress_timer = interval(PROGRESS_INTERVAL);
        progress_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut prev_events: u64 = 0;
        let mut prev_time = std::time::Instant::now();

        loop {
            tokio::select! {
                msg = record_receiver.recv() => {
                    match msg {
                        Some(StreamMessage::Records { records, offsets }) => {
                            info!(
                                record_count = records.len(),
                                offset_count = offsets.len(),
                                "Received change records from consumer"
                            );
                            let report = self.handler.process(records).await;
                            self.total_events_processed.fetch_add(report.total as u64, Ordering::Relaxed);
                            self.total_events_failed.fetch_add(report.failed as u64, Ordering::Relaxed);

                            let ack = match report.into_result() {
                                Ok(message) => {
                                    info!(message = %message, "Batch succeeded");
                                    StreamMessage::Acknowledgment { offsets, success: true, error: None }
                                }
                                Err(e) => {
                                    error!(error = %e, "Batch failed. Sending NACK to broker");
                                    StreamMessage::Acknowledgment { offsets, success: false, error: Some(e.to_string()) }
                                }
                            };
                            let _ = ack_transmitter.send(ack).await;
                        }
                        Some(StreamMessage::Error(e)) => {
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                        Some(StreamMessage::Acknowledgment { .. }) => {
                            warn!("Received acknowledgment on record channel (should be on ack channel)");
                        }
                    }
                }
                _ = shutdown_requested.recv() => {
                    info!("Shutdown requested");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
                _ = progress_timer.tick() => {
                    let events = self.total_events_processed.load(Ordering::Relaxed);
                    let now = std::time::Instant::now();
                    let elapsed_secs = now.duration_since(prev_time).as_secs_f64();
                    let events_per_sec = if elapsed_secs > 0.0 {
                        (events.saturating_sub(prev_events) as f64) / elapsed_secs
                    } else {
                        0.0
                    };

                    info!(
                        events_processed = events,
                        events_failed = self.total_events_failed.load(Ordering::Relaxed),
                        events_per_sec = format!("{:.2}", events_per_sec),
                        "Processing progress"
                    );

                    prev_events = events;
                    prev_time = now;
                }
            }
        }

        // Unacknowledged batches are redelivered on restart (at-least-once)
        drop(ack_transmitter);
        let consumer_result = match consumer_handle.await {
            Ok(result) => result,
            Err(e) => Err(IngestError::ChannelError(format!("Consumer task failed: {}", e))),
        };

        info!(
            total_events_processed = self.events_processed(),
            total_events_failed = self.events_failed(),
            "Orchestrator shutdown complete"
        );
        consumer_result
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// A handle that can trigger shutdown while `run` holds `&mut self`.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}
