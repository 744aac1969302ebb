//! Integration tests for the search indexer orchestrator.
//!
//! These tests use the real Orchestrator, router and pipelines but mock the
//! edges (Kafka consumer, content API and search engine).

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;

use content_api::{ContentFetcher, MockContentClient};
use search_indexer::consumer::{MessageOffset, StreamMessage};
use search_indexer::errors::IngestError;
use search_indexer::handler::BatchHandler;
use search_indexer::orchestrator::{Consumer, Orchestrator, OrchestratorConfig};
use search_indexer::processor::{EventRouter, TransformerRegistry};
use search_indexer_repository::{
    IndexGateway, IndexGatewayConfig, MemorySearchProvider, ProviderCall,
};
use search_indexer_shared::{ChangeRecord, ContentType};
use serde_json::{json, Value};

const CONTENT_ARN: &str = "arn:aws:dynamodb:us-east-1:123:table/content/stream/2024-01-01T00:00:00.000";
const SERIES_ARN: &str = "arn:aws:dynamodb:us-east-1:123:table/series/stream/2024-01-01T00:00:00.000";
const USERS_ARN: &str = "arn:aws:dynamodb:us-east-1:123:table/users/stream/2024-01-01T00:00:00.000";

/// An acknowledgment the mock consumer received: (success, error).
type Ack = (bool, Option<String>);

// Mock Consumer for testing
struct MockConsumer {
    batches: Vec<Vec<ChangeRecord>>,
    error_on_subscribe: bool,
    wait_for_shutdown: bool,
    acks: Arc<Mutex<Vec<Ack>>>,
}

impl MockConsumer {
    fn new(batches: Vec<Vec<ChangeRecord>>) -> Self {
        Self {
            batches,
            error_on_subscribe: false,
            wait_for_shutdown: false,
            acks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_subscribe_error() -> Self {
        Self {
            error_on_subscribe: true,
            ..Self::new(vec![])
        }
    }

    /// A consumer that delivers nothing and only stops on shutdown.
    fn idle() -> Self {
        Self {
            wait_for_shutdown: true,
            ..Self::new(vec![])
        }
    }
}

#[async_trait::async_trait]
impl Consumer for MockConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        if self.error_on_subscribe {
            Err(IngestError::kafka("Mock subscribe error"))
        } else {
            Ok(())
        }
    }

    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut ack_receiver: mpsc::Receiver<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        if self.wait_for_shutdown {
            let _ = shutdown.recv().await;
            return Ok(());
        }

        for (offset, records) in self.batches.iter().enumerate() {
            let offsets: Vec<MessageOffset> = vec![("content.changes".to_string(), 0, offset as i64)];
            sender
                .send(StreamMessage::Records {
                    records: records.clone(),
                    offsets,
                })
                .await
                .map_err(|e| IngestError::ChannelError(e.to_string()))?;

            // One batch in flight at a time, like a partition consumer
            if let Some(StreamMessage::Acknowledgment { success, error, .. }) =
                ack_receiver.recv().await
            {
                self.acks.lock().unwrap().push((success, error.clone()));
                // A rejected batch stays uncommitted; stop like the Kafka consumer does
                if !success {
                    return Err(IngestError::BatchRejected(error.unwrap_or_default()));
                }
            }
        }

        let _ = sender.send(StreamMessage::End).await;
        Ok(())
    }
}

struct Harness {
    provider: Arc<MemorySearchProvider>,
    content: Arc<MockContentClient>,
    handler: BatchHandler,
}

impl Harness {
    fn new() -> Self {
        let provider = Arc::new(MemorySearchProvider::new());
        let content = Arc::new(MockContentClient::new());
        let gateway = IndexGateway::new(
            provider.clone(),
            IndexGatewayConfig::default(),
            ContentType::Video,
        );
        let fetcher: Arc<dyn ContentFetcher> = content.clone();
        let registry = TransformerRegistry::standard(fetcher, &gateway, vec![]);
        let handler = BatchHandler::new(EventRouter::new(registry));

        Self {
            provider,
            content,
            handler,
        }
    }

    fn orchestrator(&self, consumer: MockConsumer) -> (Orchestrator, Arc<Mutex<Vec<Ack>>>) {
        let acks = Arc::clone(&consumer.acks);
        (
            Orchestrator::new(Arc::new(consumer), self.handler.clone()),
            acks,
        )
    }
}

fn record(arn: &str, event_name: &str, keys: Value, image: Value) -> ChangeRecord {
    let image_field = if event_name == "REMOVE" {
        "OldImage"
    } else {
        "NewImage"
    };
    serde_json::from_value(json!({
        "eventID": format!("{}-{}", event_name, keys),
        "eventName": event_name,
        "eventSourceARN": arn,
        "dynamodb": {
            "Keys": keys,
            image_field: image
        }
    }))
    .unwrap()
}

fn content_record(event_name: &str, content_type: &str, site: &str, id: &str) -> ChangeRecord {
    record(
        CONTENT_ARN,
        event_name,
        json!({"site": {"S": site}, "id": {"S": id}}),
        json!({"contentType": {"S": content_type}, "site": {"S": site}, "id": {"S": id}}),
    )
}

fn video_api_record() -> Value {
    json!({
        "gist": {
            "title": "X",
            "description": "d",
            "primaryCategory": {"title": "Action"},
            "isTrailer": false,
            "free": true,
            "year": 2020
        },
        "categories": [{"title": "C1"}],
        "tags": [],
        "contentDetails": {"status": "PUBLISHED"},
        "creditBlocks": []
    })
}

async fn run_to_completion(orchestrator: &mut Orchestrator) {
    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(result.is_ok(), "Orchestrator should not hang");
    assert!(result.unwrap().is_ok());
}

#[tokio::test]
async fn test_orchestrator_full_integration() {
    let harness = Harness::new();
    harness
        .content
        .register_record(ContentType::Video, "acme", "v1", video_api_record());
    harness.content.register_record(
        ContentType::Article,
        "acme",
        "a1",
        json!({"gist": {"title": "Story"}}),
    );
    let series = record(
        SERIES_ARN,
        "INSERT",
        json!({"site": {"S": "acme"}, "id": {"S": "s1"}}),
        json!({"site": {"S": "acme"}, "id": {"S": "s1"}, "title": {"S": "Saga"}}),
    );

    let batch = vec![
        content_record("INSERT", "VIDEO", "acme", "v1"),
        content_record("MODIFY", "ARTICLE", "acme", "a1"),
        series,
    ];
    let (mut orchestrator, acks) = harness.orchestrator(MockConsumer::new(vec![batch]));

    run_to_completion(&mut orchestrator).await;

    assert_eq!(*acks.lock().unwrap(), vec![(true, None)]);
    assert_eq!(orchestrator.events_processed(), 3);
    assert_eq!(orchestrator.events_failed(), 0);
    assert_eq!(harness.provider.document_count("acme"), 3);
    assert_eq!(
        harness.provider.document("acme", "a1").unwrap()["articleTitle"],
        "Story"
    );
    assert_eq!(
        harness.provider.document("acme", "s1").unwrap()["seriesTitle"],
        "Saga"
    );
    // Series are indexed from the event image, only two API reads happen
    assert_eq!(harness.content.fetch_count(), 2);
}

#[tokio::test]
async fn test_video_insert_produces_expected_document() {
    let harness = Harness::new();
    harness
        .content
        .register_record(ContentType::Video, "acme", "v1", video_api_record());

    let report = harness
        .handler
        .process(vec![content_record("INSERT", "VIDEO", "acme", "v1")])
        .await;
    assert!(report.is_success());

    let document = harness.provider.document("acme", "v1").unwrap();
    assert_eq!(document["type"], "video");
    assert_eq!(document["videoTitle"], "X");
    assert_eq!(document["videoPrimaryCategory"], "Action");
    assert_eq!(document["videoCategories"], json!([{"name": "C1"}]));
    assert_eq!(document["videoTags"], Value::Null);
    assert_eq!(document["status"], "PUBLISHED");
    assert_eq!(document["isTrailer"], false);
    assert_eq!(document["free"], true);
    assert_eq!(document["year"], 2020);
    assert_eq!(document["data"], video_api_record());
}

#[tokio::test]
async fn test_repeated_upsert_is_idempotent() {
    let harness = Harness::new();
    harness
        .content
        .register_record(ContentType::Video, "acme", "v1", video_api_record());

    let insert = content_record("INSERT", "VIDEO", "acme", "v1");
    let (mut orchestrator, acks) =
        harness.orchestrator(MockConsumer::new(vec![vec![insert.clone()]]));
    run_to_completion(&mut orchestrator).await;
    let first = harness.provider.document("acme", "v1").unwrap();

    let (mut orchestrator, _) = harness.orchestrator(MockConsumer::new(vec![vec![insert]]));
    run_to_completion(&mut orchestrator).await;
    let second = harness.provider.document("acme", "v1").unwrap();

    assert_eq!(*acks.lock().unwrap(), vec![(true, None)]);
    assert_eq!(first, second);
    assert_eq!(harness.provider.document_count("acme"), 1);
    assert_eq!(harness.provider.create_count(), 1);
}

#[tokio::test]
async fn test_remove_of_missing_document_succeeds() {
    let harness = Harness::new();
    let remove = content_record("REMOVE", "VIDEO", "acme", "v1");
    let (mut orchestrator, acks) = harness.orchestrator(MockConsumer::new(vec![vec![remove]]));

    run_to_completion(&mut orchestrator).await;

    assert_eq!(*acks.lock().unwrap(), vec![(true, None)]);
    assert_eq!(harness.provider.delete_count(), 1);
    assert_eq!(harness.provider.write_count(), 0);
    assert!(harness.provider.calls().contains(&ProviderCall::DeleteDocument {
        index: "acme".to_string(),
        id: "v1".to_string(),
    }));
    assert_eq!(harness.content.fetch_count(), 0);
}

#[tokio::test]
async fn test_remove_deletes_indexed_document() {
    let harness = Harness::new();
    harness
        .content
        .register_record(ContentType::Video, "acme", "v1", video_api_record());

    let batches = vec![
        vec![content_record("INSERT", "VIDEO", "acme", "v1")],
        vec![content_record("REMOVE", "VIDEO", "acme", "v1")],
    ];
    let (mut orchestrator, acks) = harness.orchestrator(MockConsumer::new(batches));

    run_to_completion(&mut orchestrator).await;

    assert_eq!(*acks.lock().unwrap(), vec![(true, None), (true, None)]);
    assert!(harness.provider.document("acme", "v1").is_none());
}

#[tokio::test]
async fn test_unknown_table_is_not_processed() {
    let harness = Harness::new();
    let unknown = record(
        USERS_ARN,
        "INSERT",
        json!({"site": {"S": "acme"}, "id": {"S": "u1"}}),
        json!({"name": {"S": "someone"}}),
    );
    let (mut orchestrator, acks) = harness.orchestrator(MockConsumer::new(vec![vec![unknown]]));

    run_to_completion(&mut orchestrator).await;

    assert_eq!(*acks.lock().unwrap(), vec![(true, None)]);
    assert_eq!(orchestrator.events_processed(), 0);
    assert_eq!(orchestrator.events_failed(), 0);
    assert!(harness.provider.calls().is_empty());
}

#[tokio::test]
async fn test_mixed_batch_reports_partial_failure() {
    let harness = Harness::new();
    harness
        .content
        .register_record(ContentType::Video, "acme", "v1", video_api_record());
    harness.content.fail_fetch_for("v2");

    let batch = vec![
        record(
            USERS_ARN,
            "INSERT",
            json!({"site": {"S": "acme"}, "id": {"S": "u1"}}),
            json!({}),
        ),
        content_record("INSERT", "VIDEO", "acme", "v1"),
        content_record("INSERT", "VIDEO", "acme", "v2"),
    ];

    let report = harness.handler.process(batch.clone()).await;
    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);

    let verdict = harness.handler.handle_batch(batch.clone()).await;
    assert!(matches!(
        verdict,
        Err(IngestError::BatchFailed {
            failed: 1,
            total: 2
        })
    ));

    let (mut orchestrator, acks) = harness.orchestrator(MockConsumer::new(vec![batch]));
    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(matches!(result, Ok(Err(IngestError::BatchRejected(_)))));

    let acks = acks.lock().unwrap();
    assert_eq!(acks.len(), 1);
    assert!(!acks[0].0, "Failed batch must be rejected");
    assert_eq!(acks[0].1.as_deref(), Some("1 of 2 events failed"));
    assert_eq!(orchestrator.events_processed(), 2);
    assert_eq!(orchestrator.events_failed(), 1);

    // The successful sibling is not rolled back
    assert!(harness.provider.document("acme", "v1").is_some());
    assert!(harness.provider.document("acme", "v2").is_none());
}

#[tokio::test]
async fn test_malformed_record_fails_the_batch() {
    let harness = Harness::new();
    harness
        .content
        .register_record(ContentType::Video, "acme", "v1", video_api_record());

    // An INSERT with neither NewImage nor OldImage
    let malformed: ChangeRecord = serde_json::from_value(json!({
        "eventID": "broken",
        "eventName": "INSERT",
        "eventSourceARN": CONTENT_ARN,
        "dynamodb": {"Keys": {"site": {"S": "acme"}, "id": {"S": "v9"}}}
    }))
    .unwrap();
    let batch = vec![malformed, content_record("INSERT", "VIDEO", "acme", "v1")];

    let report = harness.handler.process(batch.clone()).await;
    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 0);

    let (mut orchestrator, acks) = harness.orchestrator(MockConsumer::new(vec![
        batch,
        vec![content_record("REMOVE", "VIDEO", "acme", "v1")],
    ]));
    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(matches!(result, Ok(Err(IngestError::BatchRejected(_)))));

    // The consumer stops at the rejected batch; the later one is never delivered
    assert_eq!(
        *acks.lock().unwrap(),
        vec![(false, Some("1 of 2 events failed".to_string()))]
    );
    assert!(harness.provider.document("acme", "v1").is_some());
    assert!(harness.provider.document("acme", "v9").is_none());
}

#[tokio::test]
async fn test_successful_batch_message_names_processed_count() {
    let harness = Harness::new();
    let verdict = harness
        .handler
        .handle_batch(vec![
            content_record("REMOVE", "VIDEO", "acme", "v1"),
            content_record("REMOVE", "PHOTO", "acme", "p1"),
        ])
        .await;

    assert_eq!(verdict.unwrap(), "Successfully processed 2 records.");
}

#[tokio::test]
async fn test_empty_batch_is_acknowledged() {
    let harness = Harness::new();
    let (mut orchestrator, acks) = harness.orchestrator(MockConsumer::new(vec![vec![]]));

    run_to_completion(&mut orchestrator).await;

    assert_eq!(*acks.lock().unwrap(), vec![(true, None)]);
    assert_eq!(orchestrator.events_processed(), 0);
    assert!(harness.provider.calls().is_empty());
}

#[tokio::test]
async fn test_orchestrator_configuration() {
    let harness = Harness::new();
    let config = OrchestratorConfig {
        channel_buffer_size: 2,
    };
    let batches = vec![
        vec![content_record("REMOVE", "VIDEO", "acme", "v1")],
        vec![content_record("REMOVE", "VIDEO", "acme", "v2")],
        vec![content_record("REMOVE", "VIDEO", "acme", "v3")],
    ];
    let consumer = MockConsumer::new(batches);
    let acks = Arc::clone(&consumer.acks);
    let mut orchestrator =
        Orchestrator::with_config(Arc::new(consumer), harness.handler.clone(), config);

    run_to_completion(&mut orchestrator).await;

    assert_eq!(acks.lock().unwrap().len(), 3);
    assert_eq!(orchestrator.events_processed(), 3);
}

#[tokio::test]
async fn test_orchestrator_shutdown() {
    let harness = Harness::new();
    let (mut orchestrator, _) = harness.orchestrator(MockConsumer::idle());
    let shutdown = orchestrator.shutdown_handle();

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = shutdown.send(());
    });

    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(trigger.await.is_ok(), "Shutdown task should succeed");
    assert!(result.is_ok(), "Orchestrator should stop on shutdown");
    assert!(result.unwrap().is_ok());
}

#[tokio::test]
async fn test_orchestrator_error_handling() {
    let harness = Harness::new();
    let (mut orchestrator, _) = harness.orchestrator(MockConsumer::with_subscribe_error());

    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(result.is_ok(), "Orchestrator should not hang");

    let run_result = result.unwrap();
    assert!(matches!(run_result, Err(IngestError::KafkaError(_))));
}
