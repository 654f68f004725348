//! Aggregate session counters.
//!
//! # Invariants
//! - `total_sorted` equals the number of records in the history store.
//! - `stolen_count`, `shooed_count` and `session_sorted` never decrease
//!   within one session.

use crate::model::bucket::BucketCounts;
use serde::{Deserialize, Serialize};

/// Read-only snapshot of session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    /// Cumulative across sessions (history store size).
    pub total_sorted: u64,
    pub stolen_count: u64,
    /// Sorted since the current session started.
    pub session_sorted: u64,
    pub shooed_count: u64,
}

/// End-of-round summary for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub sorted: BucketCounts,
    pub stolen: u64,
    pub shooed: u64,
}
