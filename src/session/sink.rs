//! Finalize hook for completed sessions.

use super::SessionRecord;
use crate::error::CoachResult;
use async_trait::async_trait;
use parking_lot::Mutex;

/// External persistence collaborator.
///
/// The engine calls `finalize` once per ended session and does not retry.
#[async_trait]
pub trait SessionSink: Send + Sync {
    async fn finalize(&self, record: &SessionRecord) -> CoachResult<()>;
}

/// Keeps finalized records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl SessionSink for MemorySink {
    async fn finalize(&self, record: &SessionRecord) -> CoachResult<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
