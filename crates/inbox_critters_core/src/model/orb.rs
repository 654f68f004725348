//! Thought orb model.
//!
//! # Responsibility
//! - Define the floating thought record created on user submission.
//! - Define the one-way orb lifecycle states.
//! - Normalize raw user input into orb text.
//!
//! # Invariants
//! - `text` is non-empty after normalization.
//! - Lifecycle is `Floating -> Sorted | Stolen`; resolved states are terminal.

use crate::model::bucket::Bucket;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a thought orb.
pub type OrbId = Uuid;

/// A user-submitted thought awaiting classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtOrb {
    pub id: OrbId,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl ThoughtOrb {
    /// Creates an orb with a generated ID.
    ///
    /// Callers are expected to pass text already normalized by
    /// [`normalize_thought_text`].
    pub fn new(text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            created_at,
        }
    }
}

/// Lifecycle state of one orb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbState {
    /// On the board. `dragging` is set between drag start and drag end.
    Floating { dragging: bool },
    Sorted(Bucket),
    Stolen,
}

impl OrbState {
    pub fn is_floating(self) -> bool {
        matches!(self, Self::Floating { .. })
    }

    pub fn is_resolved(self) -> bool {
        !self.is_floating()
    }
}

/// Trims surrounding whitespace. Inner line breaks and spacing are kept.
///
/// Returns `None` when nothing but whitespace remains.
pub fn normalize_thought_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_thought_text, OrbState};
    use crate::model::bucket::Bucket;

    #[test]
    fn normalize_trims_but_keeps_inner_lines() {
        assert_eq!(
            normalize_thought_text("  groceries:\n- milk\n- eggs \n").as_deref(),
            Some("groceries:\n- milk\n- eggs")
        );
    }

    #[test]
    fn normalize_rejects_blank_input() {
        assert_eq!(normalize_thought_text(" \n\t "), None);
        assert_eq!(normalize_thought_text(""), None);
    }

    #[test]
    fn only_floating_state_is_unresolved() {
        assert!(!OrbState::Floating { dragging: true }.is_resolved());
        assert!(OrbState::Sorted(Bucket::High).is_resolved());
        assert!(OrbState::Stolen.is_resolved());
    }
}
