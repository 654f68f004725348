//! Sorted thought ledger record.
//!
//! # Responsibility
//! - Define the immutable record appended to the history store when an orb
//!   is sorted into a bucket.
//!
//! # Invariants
//! - `id` equals the ID of the orb that was sorted.
//! - Records are never mutated or deleted by core.

use crate::model::bucket::Bucket;
use crate::model::orb::{OrbId, ThoughtOrb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedThought {
    pub id: OrbId,
    pub text: String,
    pub bucket: Bucket,
    /// Unix epoch milliseconds of the sort.
    pub timestamp: i64,
}

impl SortedThought {
    /// Builds the ledger record for `orb` sorted into `bucket`.
    pub fn from_orb(orb: &ThoughtOrb, bucket: Bucket, timestamp: i64) -> Self {
        Self {
            id: orb.id,
            text: orb.text.clone(),
            bucket,
            timestamp,
        }
    }
}
