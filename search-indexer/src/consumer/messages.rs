//! Message types for the consumer.
//!
//! Defines the messages exchanged between the consumer and the orchestrator.

use search_indexer_shared::ChangeRecord;
use serde::Deserialize;

/// Kafka offset of one consumed message: (topic, partition, offset).
pub type MessageOffset = (String, i32, i64);

/// A Kafka payload: one change record, or a stream batch envelope of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChangePayload {
    Batch {
        #[serde(rename = "Records")]
        records: Vec<ChangeRecord>,
    },
    Single(ChangeRecord),
}

impl ChangePayload {
    pub fn into_records(self) -> Vec<ChangeRecord> {
        match self {
            Self::Batch { records } => records,
            Self::Single(record) => vec![record],
        }
    }
}

/// Messages that flow through the ingest.
#[derive(Debug)]
pub enum StreamMessage {
    /// A batch of change records with associated offsets for acknowledgment.
    Records {
        records: Vec<ChangeRecord>,
        offsets: Vec<MessageOffset>,
    },
    /// Acknowledgment that a batch was (or wasn't) fully processed.
    Acknowledgment {
        offsets: Vec<MessageOffset>,
        success: bool,
        error: Option<String>,
    },
    /// Stream has ended.
    End,
    /// An error occurred.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_record_payload() {
        let payload: ChangePayload = serde_json::from_str(
            r#"{"eventName":"REMOVE","eventSourceARN":"table/content/stream/1","dynamodb":{"Keys":{}}}"#,
        )
        .unwrap();

        let records = payload.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_name, "REMOVE");
    }

    #[test]
    fn test_envelope_payload() {
        let payload: ChangePayload = serde_json::from_str(
            r#"{"Records":[{"eventName":"INSERT"},{"eventName":"MODIFY"}]}"#,
        )
        .unwrap();

        let names: Vec<String> = payload
            .into_records()
            .into_iter()
            .map(|record| record.event_name)
            .collect();
        assert_eq!(names, vec!["INSERT".to_string(), "MODIFY".to_string()]);
    }
}
