//! Batch entrypoint: router, then tracker, then verdict.

use search_indexer_shared::ChangeRecord;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::IngestError;
use crate::processor::EventRouter;
use crate::tracker::{BatchReport, BatchTracker};

/// Handles one batch of change records.
#[derive(Clone)]
pub struct BatchHandler {
    router: EventRouter,
}

impl BatchHandler {
    pub fn new(router: EventRouter) -> Self {
        Self { router }
    }

    /// Fan the batch out and wait for every event to settle.
    #[instrument(skip(self, records), fields(batch_id = %Uuid::new_v4(), record_count = records.len()))]
    pub async fn process(&self, records: Vec<ChangeRecord>) -> BatchReport {
        let batch = self.router.dispatch(records);
        info!(
            dispatched = batch.operations.len(),
            skipped = batch.skipped,
            "Dispatched change records"
        );
        BatchTracker::settle(batch.operations, batch.skipped).await
    }

    /// Process the batch and return its verdict.
    ///
    /// `Ok` names the number of processed events; `Err(BatchFailed)` names the
    /// number that failed. Succeeded items are not rolled back either way.
    pub async fn handle_batch(&self, records: Vec<ChangeRecord>) -> Result<String, IngestError> {
        self.process(records).await.into_result()
    }
}
