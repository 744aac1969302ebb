//! Event router.
//!
//! Classifies each change record by source table and record shape and hands
//! it to the registered pipeline for its content type. Every dispatched event
//! yields exactly one in-flight operation; nothing is awaited here.

use futures::future::{self, BoxFuture, FutureExt};
use search_indexer_shared::{
    image_str, ChangeAction, ChangeEvent, ChangeRecord, ContentType, Image,
};
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::processor::TransformerRegistry;
use crate::tracker::ItemOutcome;

/// Table holding videos, articles, events, audio and photos.
const CONTENT_TABLE: &str = "content";

/// Table holding series and their season/episode rows.
const SERIES_TABLE: &str = "series";

/// Discriminator field of the content table.
const CONTENT_TYPE_FIELD: &str = "contentType";

/// Field present only on series child rows.
const SERIES_SUBTYPE_FIELD: &str = "objectKey";

/// One dispatched, not yet settled, event.
pub type Operation = BoxFuture<'static, ItemOutcome>;

/// Why a record was left out of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownTable(String),
    UnsupportedType(String),
    SeriesChildRecord,
    Unregistered(ContentType),
}

/// Classification of one change record.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Dispatch {
        content_type: ContentType,
        event: ChangeEvent,
    },
    Skip(SkipReason),
}

/// The operations a batch fanned out into, plus the number of skipped records.
#[derive(Default)]
pub struct DispatchedBatch {
    pub operations: Vec<Operation>,
    pub skipped: usize,
}

/// Routes change records to content pipelines.
#[derive(Clone)]
pub struct EventRouter {
    registry: TransformerRegistry,
    stage: Option<String>,
}

impl EventRouter {
    pub fn new(registry: TransformerRegistry) -> Self {
        Self {
            registry,
            stage: None,
        }
    }

    /// Strip `stage` decoration from table names (`dev-content`, `content_dev`).
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        let stage = stage.into().trim().to_lowercase();
        self.stage = if stage.is_empty() { None } else { Some(stage) };
        self
    }

    /// Classify every record and start one operation per dispatched event.
    pub fn dispatch(&self, records: Vec<ChangeRecord>) -> DispatchedBatch {
        let mut batch = DispatchedBatch::default();

        for record in records {
            match self.classify(&record) {
                Ok(Route::Dispatch {
                    content_type,
                    event,
                }) => match self.registry.get(content_type) {
                    Some(pipeline) => {
                        let operation = async move {
                            let result = pipeline.run(&event).await;
                            ItemOutcome {
                                site: Some(event.site),
                                content_id: Some(event.content_id),
                                content_type: Some(content_type),
                                result,
                            }
                        };
                        batch.operations.push(operation.boxed());
                    }
                    None => {
                        Self::log_skip(&record, &SkipReason::Unregistered(content_type));
                        batch.skipped += 1;
                    }
                },
                Ok(Route::Skip(reason)) => {
                    Self::log_skip(&record, &reason);
                    batch.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        event_id = record.event_id.as_deref().unwrap_or("-"),
                        error = %e,
                        "Malformed change record"
                    );
                    let keys = &record.dynamodb.keys;
                    let outcome = ItemOutcome {
                        site: image_str(keys, "site").map(str::to_string),
                        content_id: image_str(keys, "id").map(str::to_string),
                        content_type: None,
                        result: Err(e),
                    };
                    batch.operations.push(future::ready(outcome).boxed());
                }
            }
        }

        batch
    }

    /// Decide what to do with one record.
    pub fn classify(&self, record: &ChangeRecord) -> Result<Route, PipelineError> {
        let source_table = source_table(&record.event_source_arn, self.stage.as_deref());
        if source_table != CONTENT_TABLE && source_table != SERIES_TABLE {
            return Ok(Route::Skip(SkipReason::UnknownTable(source_table)));
        }

        let stream = &record.dynamodb;
        let image = stream
            .new_image
            .as_ref()
            .or(stream.old_image.as_ref())
            .ok_or_else(|| PipelineError::malformed("record has neither NewImage nor OldImage"))?;

        let content_type = if source_table == SERIES_TABLE {
            if image.contains_key(SERIES_SUBTYPE_FIELD) {
                return Ok(Route::Skip(SkipReason::SeriesChildRecord));
            }
            ContentType::Series
        } else {
            let discriminator = image_str(image, CONTENT_TYPE_FIELD).unwrap_or_default();
            match ContentType::from_discriminator(discriminator) {
                Some(content_type) if content_type != ContentType::Series => content_type,
                _ => {
                    return Ok(Route::Skip(SkipReason::UnsupportedType(
                        discriminator.to_string(),
                    )))
                }
            }
        };

        let site = key(&stream.keys, image, &["site"])
            .ok_or_else(|| PipelineError::malformed("record has no site"))?;
        let content_id = key(&stream.keys, image, &["id", SERIES_SUBTYPE_FIELD])
            .ok_or_else(|| PipelineError::malformed("record has no id"))?;

        Ok(Route::Dispatch {
            content_type,
            event: ChangeEvent {
                source_table,
                action: ChangeAction::from_event_name(&record.event_name),
                site,
                content_id,
                new_image: stream.new_image.clone(),
                old_image: stream.old_image.clone(),
            },
        })
    }

    fn log_skip(record: &ChangeRecord, reason: &SkipReason) {
        debug!(
            event_id = record.event_id.as_deref().unwrap_or("-"),
            reason = ?reason,
            "Skipping change record"
        );
    }
}

/// Read the first non-empty value of `names` from the keys, then from the image.
fn key(keys: &Image, image: &Image, names: &[&str]) -> Option<String> {
    [keys, image]
        .into_iter()
        .flat_map(|source| names.iter().filter_map(move |name| image_str(source, name)))
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Extract the logical table name from a stream origin identifier.
///
/// `arn:aws:dynamodb:<region>:<account>:table/<Table>/stream/<ts>` yields
/// `<table>` (lowercased); an identifier without a `table/` component is taken
/// as the table name itself. A `stage` prefix or suffix is removed.
pub fn source_table(origin: &str, stage: Option<&str>) -> String {
    let table = match origin.split_once("table/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or(rest),
        None => origin,
    };
    let table = table.trim().to_lowercase();

    let Some(stage) = stage else {
        return table;
    };
    for separator in ['-', '_'] {
        if let Some(stripped) = table.strip_prefix(&format!("{}{}", stage, separator)) {
            return stripped.to_string();
        }
        if let Some(stripped) = table.strip_suffix(&format!("{}{}", separator, stage)) {
            return stripped.to_string();
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const ARN: &str = "arn:aws:dynamodb:us-east-1:123:table/content/stream/2024-01-01T00:00:00.000";

    fn record(arn: &str, event_name: &str, keys: Value, new_image: Option<Value>) -> ChangeRecord {
        serde_json::from_value(json!({
            "eventID": "e1",
            "eventName": event_name,
            "eventSourceARN": arn,
            "dynamodb": {
                "Keys": keys,
                "NewImage": new_image,
            }
        }))
        .unwrap()
    }

    fn router() -> EventRouter {
        EventRouter::new(TransformerRegistry::new())
    }

    #[test]
    fn test_source_table() {
        assert_eq!(source_table(ARN, None), "content");
        assert_eq!(
            source_table("arn:aws:dynamodb:x:1:table/Series/stream/ts", None),
            "series"
        );
        assert_eq!(
            source_table("arn:aws:dynamodb:x:1:table/prod-content/stream/ts", Some("prod")),
            "content"
        );
        assert_eq!(source_table("series_dev", Some("dev")), "series");
        assert_eq!(source_table("content", Some("dev")), "content");
    }

    #[test]
    fn test_classify_video_insert() {
        let record = record(
            ARN,
            "MODIFY",
            json!({"site": {"S": "acme"}, "id": {"S": "v1"}}),
            Some(json!({"contentType": {"S": "VIDEO"}})),
        );

        let Route::Dispatch {
            content_type,
            event,
        } = router().classify(&record).unwrap()
        else {
            panic!("expected a dispatch");
        };

        assert_eq!(content_type, ContentType::Video);
        assert_eq!(event.action, ChangeAction::Upsert);
        assert_eq!(event.site, "acme");
        assert_eq!(event.content_id, "v1");
        assert_eq!(event.source_table, "content");
    }

    #[test]
    fn test_classify_remove_uses_old_image() {
        let record: ChangeRecord = serde_json::from_value(json!({
            "eventName": "REMOVE",
            "eventSourceARN": ARN,
            "dynamodb": {
                "Keys": {},
                "OldImage": {
                    "site": {"S": "acme"},
                    "id": {"S": "p1"},
                    "contentType": {"S": "photo"}
                }
            }
        }))
        .unwrap();

        let Route::Dispatch {
            content_type,
            event,
        } = router().classify(&record).unwrap()
        else {
            panic!("expected a dispatch");
        };

        assert_eq!(content_type, ContentType::Photo);
        assert_eq!(event.action, ChangeAction::Remove);
        assert_eq!(event.site, "acme");
        assert_eq!(event.content_id, "p1");
    }

    #[test]
    fn test_unknown_table_is_skipped() {
        let record = record(
            "arn:aws:dynamodb:x:1:table/users/stream/ts",
            "INSERT",
            json!({}),
            None,
        );

        assert_eq!(
            router().classify(&record).unwrap(),
            Route::Skip(SkipReason::UnknownTable("users".to_string()))
        );
    }

    #[test]
    fn test_unknown_discriminator_is_skipped() {
        let record = record(
            ARN,
            "INSERT",
            json!({"site": {"S": "acme"}, "id": {"S": "x"}}),
            Some(json!({"contentType": {"S": "PODCAST"}})),
        );

        assert_eq!(
            router().classify(&record).unwrap(),
            Route::Skip(SkipReason::UnsupportedType("PODCAST".to_string()))
        );
    }

    #[test]
    fn test_series_child_record_is_skipped() {
        let record = record(
            "arn:aws:dynamodb:x:1:table/series/stream/ts",
            "INSERT",
            json!({"site": {"S": "acme"}, "id": {"S": "s1"}}),
            Some(json!({"objectKey": {"S": "season#1"}})),
        );

        assert_eq!(
            router().classify(&record).unwrap(),
            Route::Skip(SkipReason::SeriesChildRecord)
        );
    }

    #[test]
    fn test_series_record_is_dispatched() {
        let record = record(
            "arn:aws:dynamodb:x:1:table/series/stream/ts",
            "INSERT",
            json!({"site": {"S": "acme"}, "id": {"S": "s1"}}),
            Some(json!({"title": {"S": "Saga"}})),
        );

        assert!(matches!(
            router().classify(&record).unwrap(),
            Route::Dispatch {
                content_type: ContentType::Series,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_images_is_malformed() {
        let record = record(ARN, "INSERT", json!({"site": {"S": "acme"}}), None);

        assert!(matches!(
            router().classify(&record),
            Err(PipelineError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_missing_site_is_malformed() {
        let record = record(
            ARN,
            "INSERT",
            json!({"id": {"S": "v1"}}),
            Some(json!({"contentType": {"S": "video"}})),
        );

        assert!(matches!(
            router().classify(&record),
            Err(PipelineError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_dispatch_counts_unregistered_as_skipped() {
        let records = vec![record(
            ARN,
            "INSERT",
            json!({"site": {"S": "acme"}, "id": {"S": "v1"}}),
            Some(json!({"contentType": {"S": "video"}})),
        )];

        let batch = router().dispatch(records);

        assert!(batch.operations.is_empty());
        assert_eq!(batch.skipped, 1);
    }
}
