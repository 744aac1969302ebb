//! Batch completion tracking.
//!
//! Settles every in-flight operation of a batch, isolating per-item failures,
//! and turns the outcomes into a single verdict.

use futures::future::join_all;
use search_indexer_shared::ContentType;
use tracing::{error, info};

use crate::errors::{IngestError, PipelineError};
use crate::loader::PipelineOutcome;
use crate::processor::Operation;

/// The settled result of one dispatched event.
#[derive(Debug)]
pub struct ItemOutcome {
    pub site: Option<String>,
    pub content_id: Option<String>,
    pub content_type: Option<ContentType>,
    pub result: Result<PipelineOutcome, PipelineError>,
}

/// Aggregate counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Records excluded from processing (unknown table or unsupported type).
    pub skipped: usize,
    /// Processed events: `succeeded + failed`.
    pub total: usize,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// The batch verdict: a message naming the processed count, or an error
    /// naming the failure count.
    pub fn into_result(self) -> Result<String, IngestError> {
        if self.failed > 0 {
            Err(IngestError::BatchFailed {
                failed: self.failed,
                total: self.total,
            })
        } else {
            Ok(format!("Successfully processed {} records.", self.total))
        }
    }
}

/// Settles batch operations.
pub struct BatchTracker;

impl BatchTracker {
    /// Await every operation, whatever the outcome of its siblings, and count
    /// the results. Failures are logged with the event's site and id.
    pub async fn settle(operations: Vec<Operation>, skipped: usize) -> BatchReport {
        let outcomes = join_all(operations).await;

        let mut report = BatchReport {
            skipped,
            total: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match &outcome.result {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        site = outcome.site.as_deref().unwrap_or("-"),
                        content_id = outcome.content_id.as_deref().unwrap_or("-"),
                        content_type = ?outcome.content_type,
                        error = %e,
                        "Failed to process change event"
                    );
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            total = report.total,
            "Batch settled"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{ready, FutureExt};
    use std::time::Duration;

    fn outcome(result: Result<PipelineOutcome, PipelineError>) -> ItemOutcome {
        ItemOutcome {
            site: Some("acme".to_string()),
            content_id: Some("x".to_string()),
            content_type: Some(ContentType::Video),
            result,
        }
    }

    #[tokio::test]
    async fn test_settle_counts_mixed_outcomes() {
        let operations: Vec<Operation> = vec![
            ready(outcome(Ok(PipelineOutcome::Indexed))).boxed(),
            ready(outcome(Err(PipelineError::malformed("no image")))).boxed(),
            ready(outcome(Ok(PipelineOutcome::AlreadyAbsent))).boxed(),
        ];

        let report = BatchTracker::settle(operations, 4).await;

        assert_eq!(
            report,
            BatchReport {
                succeeded: 2,
                failed: 1,
                skipped: 4,
                total: 3
            }
        );
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let operations: Vec<Operation> = vec![
            ready(outcome(Err(PipelineError::malformed("first")))).boxed(),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                outcome(Ok(PipelineOutcome::Indexed))
            }
            .boxed(),
        ];

        let report = BatchTracker::settle(operations, 0).await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_into_result() {
        let ok = BatchReport {
            succeeded: 2,
            total: 2,
            ..Default::default()
        };
        assert_eq!(ok.into_result().unwrap(), "Successfully processed 2 records.");

        let failed = BatchReport {
            succeeded: 1,
            failed: 1,
            total: 2,
            ..Default::default()
        };
        assert!(matches!(
            failed.into_result(),
            Err(IngestError::BatchFailed { failed: 1, total: 2 })
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds() {
        let report = BatchTracker::settle(Vec::new(), 0).await;
        assert_eq!(report.into_result().unwrap(), "Successfully processed 0 records.");
    }
}
