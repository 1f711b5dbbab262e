//! Bounded, most-recent-first request history guarded by a reader/writer lock

use crate::domain::config_types::HistoryCapacity;
use crate::history::record::RequestRecord;
use crate::history::stats::RequestStats;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Shared store of completed request records.
///
/// Appends and clears take the write lock; snapshots take the read lock and
/// hand back an owned copy, so callers never hold references into the store.
/// Ordering is insertion order (most recent first), not timestamp order.
#[derive(Debug)]
pub struct HistoryStore {
    records: RwLock<VecDeque<RequestRecord>>,
    capacity: HistoryCapacity,
}

impl HistoryStore {
    pub fn new(capacity: HistoryCapacity) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            capacity,
        }
    }

    /// Finalize the record's durations and insert it at the front, evicting
    /// the oldest records beyond capacity.
    pub fn append(&self, mut record: RequestRecord) {
        record.compute_durations();

        let mut records = self.records.write();
        records.push_front(record);
        records.truncate(*self.capacity.as_ref());
    }

    /// Independent copy of the current contents, most recent first.
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        self.records.read().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Aggregate statistics over the current contents.
    pub fn stats(&self) -> RequestStats {
        RequestStats::from_records(self.records.read().iter())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn capacity(&self) -> HistoryCapacity {
        self.capacity
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(HistoryCapacity::default())
    }
}
