//! Per-partition commit watermarks.
//!
//! Kafka commits are positional: committing `n` marks everything below `n` as
//! consumed. The tracker therefore only releases the leading run of settled
//! offsets of each partition, and never moves past an offset that is still in
//! flight or whose batch was rejected.

use std::collections::{BTreeMap, HashMap};

use crate::consumer::messages::MessageOffset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetState {
    InFlight,
    Done,
    Failed,
}

/// Tracks consumed offsets until they can be committed.
#[derive(Debug, Default)]
pub struct OffsetTracker {
    partitions: HashMap<(String, i32), BTreeMap<i64, OffsetState>>,
}

impl OffsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message as read but not yet settled.
    pub fn track(&mut self, offset: &MessageOffset) {
        let (topic, partition, offset) = offset;
        self.partitions
            .entry((topic.clone(), *partition))
            .or_default()
            .insert(*offset, OffsetState::InFlight);
    }

    /// Mark offsets as settled. Untracked offsets are ignored.
    pub fn complete(&mut self, offsets: &[MessageOffset]) {
        self.set(offsets, OffsetState::Done);
    }

    /// Mark offsets as belonging to a rejected batch. They pin their partition.
    pub fn fail(&mut self, offsets: &[MessageOffset]) {
        self.set(offsets, OffsetState::Failed);
    }

    fn set(&mut self, offsets: &[MessageOffset], state: OffsetState) {
        for (topic, partition, offset) in offsets {
            if let Some(entry) = self
                .partitions
                .get_mut(&(topic.clone(), *partition))
                .and_then(|pending| pending.get_mut(offset))
            {
                *entry = state;
            }
        }
    }

    /// Drain the settled prefix of every partition.
    ///
    /// Returns `(topic, partition, next_offset)` for each partition whose
    /// watermark moved; `next_offset` is the value to commit.
    pub fn committable(&mut self) -> Vec<MessageOffset> {
        let mut ready = Vec::new();

        for ((topic, partition), pending) in self.partitions.iter_mut() {
            let mut last_done = None;
            while let Some((&offset, &state)) = pending.first_key_value() {
                if state != OffsetState::Done {
                    break;
                }
                pending.remove(&offset);
                last_done = Some(offset);
            }
            if let Some(offset) = last_done {
                ready.push((topic.clone(), *partition, offset + 1));
            }
        }

        ready.sort();
        ready
    }
}
