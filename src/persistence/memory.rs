use log::{info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{FeedbackRecord, PersistenceError, Result};

/// Keeps submissions in process memory. Used by the `memory` backend and by tests.
#[derive(Debug, Default)]
pub struct MemoryFeedbackStore {
    rows: Mutex<Vec<FeedbackRecord>>,
    failure: Mutex<Option<String>>,
    insert_calls: AtomicUsize,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following insert fail with `detail` until `clear_failure`.
    pub fn fail_with(&self, detail: impl Into<String>) {
        *self.failure.lock() = Some(detail.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    pub fn insert(&self, record: &FeedbackRecord) -> Result<Vec<FeedbackRecord>> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(detail) = self.failure.lock().clone() {
            warn!("Memory store refusing insert: {}", detail);
            return Err(PersistenceError::Rejected(detail));
        }

        let mut rows = self.rows.lock();
        rows.push(record.clone());
        info!("Stored feedback for {} ({} rows in memory)", record.enrollment_id, rows.len());
        Ok(vec![record.clone()])
    }

    pub fn rows(&self) -> Vec<FeedbackRecord> {
        self.rows.lock().clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}
