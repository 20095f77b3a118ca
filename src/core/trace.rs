//! Diagnostic log of taken transitions.
//!
//! The engine appends one record each time a trigger resolves, giving
//! hosts an ordered, serializable view of what the machine did and when.
//! This is in-memory diagnostics only; nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of one taken transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the state whose outgoing transition fired.
    pub from: String,
    /// Name of the target state.
    pub to: String,
    /// 1-based tick index on which the transition resolved.
    pub tick: u64,
    /// Wall-clock time the record was written.
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of taken transitions.
///
/// `record` returns a new log rather than mutating in place, so a caller
/// holding a snapshot never observes later appends.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TraceLog {
    records: Vec<TransitionRecord>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning the extended log.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// All records in the order they were taken.
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    /// State names visited, in order: the first record's source followed
    /// by every record's target.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
