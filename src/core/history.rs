//! Firing history tracking.
//!
//! Tracks the transitions a machine instance fired. Recording appends in
//! place, and an optional limit evicts the oldest records so a long-running
//! instance keeps a fixed-size window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single transition firing.
///
/// # Example
///
/// ```rust
/// use efsm::core::FiringRecord;
/// use chrono::Utc;
///
/// let record = FiringRecord {
///     transition: "start".to_string(),
///     from: "off".to_string(),
///     to: "on".to_string(),
///     timestamp: Utc::now(),
///     responses: 1,
/// };
/// assert_eq!(record.transition, "start");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiringRecord {
    /// Name of the transition that fired
    pub transition: String,
    /// Location the instance was in
    pub from: String,
    /// Location the instance moved to
    pub to: String,
    /// When the firing was committed
    pub timestamp: DateTime<Utc>,
    /// Number of response terms produced
    pub responses: usize,
}

/// Ordered history of firings.
///
/// # Example
///
/// ```rust
/// use efsm::core::{FiringHistory, FiringRecord};
/// use chrono::Utc;
///
/// let record = |transition: &str, from: &str, to: &str| FiringRecord {
///     transition: transition.to_string(),
///     from: from.to_string(),
///     to: to.to_string(),
///     timestamp: Utc::now(),
///     responses: 0,
/// };
///
/// let history = FiringHistory::new()
///     .record(record("start", "off", "on"))
///     .record(record("stop", "on", "off"));
///
/// assert_eq!(history.path(), vec!["off", "on", "off"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FiringHistory {
    records: VecDeque<FiringRecord>,
}

impl FiringHistory {
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
        }
    }

    /// Append a firing, consuming and returning the history.
    pub fn record(mut self, record: FiringRecord) -> Self {
        self.push(record, None);
        self
    }

    /// Append a firing in place, then evict the oldest records beyond `limit`.
    pub fn push(&mut self, record: FiringRecord, limit: Option<usize>) {
        self.records.push_back(record);
        if let Some(limit) = limit {
            self.truncate_front(limit);
        }
    }

    /// Keep only the most recent `limit` records.
    pub fn retain_last(mut self, limit: usize) -> Self {
        self.truncate_front(limit);
        self
    }

    fn truncate_front(&mut self, limit: usize) {
        while self.records.len() > limit {
            self.records.pop_front();
        }
    }

    /// Location names traversed: the first source, then each target.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Time between the first and last recorded firing.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.front(), self.records.back()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// Records from oldest to newest.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &FiringRecord> + ExactSizeIterator {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&FiringRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
