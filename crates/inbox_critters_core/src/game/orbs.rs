//! Orb lifecycle manager.
//!
//! # Responsibility
//! - Create floating orbs under the board capacity cap.
//! - Track drag state and resolve orbs into `Sorted` or `Stolen`.
//!
//! # Invariants
//! - Floating orb count never exceeds the configured cap.
//! - Every orb resolves at most once: the state is checked before each
//!   transition and anything not `Floating` is rejected (first writer wins).
//! - Resolved orbs leave the board but their outcome stays queryable.

use crate::game::config::GameConfig;
use crate::model::bucket::Bucket;
use crate::model::orb::{normalize_thought_text, OrbId, OrbState, ThoughtOrb};
use crate::model::thought::SortedThought;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OrbResult<T> = Result<T, OrbError>;

/// Orb lifecycle errors. None of them is fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrbError {
    /// Text was empty after trimming.
    EmptyText,
    TooLong { max: usize, actual: usize },
    CapacityExceeded { cap: usize },
    /// Drag requested on an orb that already left the board.
    NotFloating(OrbId),
    /// Drag end/move on a floating orb that is not being dragged.
    NotDragging(OrbId),
    AlreadyResolved(OrbId),
    NotFound(OrbId),
}

impl OrbError {
    /// Stable code used in log lines and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyText => "empty_text",
            Self::TooLong { .. } => "too_long",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::NotFloating(_) => "not_floating",
            Self::NotDragging(_) => "not_dragging",
            Self::AlreadyResolved(_) => "already_resolved",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl Display for OrbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "thought text cannot be empty"),
            Self::TooLong { max, actual } => {
                write!(f, "thought text has {actual} characters; limit is {max}")
            }
            Self::CapacityExceeded { cap } => {
                write!(f, "board already holds the maximum of {cap} floating orbs")
            }
            Self::NotFloating(id) => write!(f, "orb is not floating: {id}"),
            Self::NotDragging(id) => write!(f, "orb is not being dragged: {id}"),
            Self::AlreadyResolved(id) => write!(f, "orb already resolved: {id}"),
            Self::NotFound(id) => write!(f, "orb not found: {id}"),
        }
    }
}

impl Error for OrbError {}

/// Result of ending a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Dropped on a bucket; the orb is now `Sorted`.
    Sorted(SortedThought),
    /// Dropped outside every bucket; the orb keeps floating.
    Cancelled,
}

#[derive(Debug, Clone)]
struct FloatingOrb {
    orb: ThoughtOrb,
    dragging: bool,
}

/// Owns every orb of one session.
#[derive(Debug, Clone)]
pub struct OrbLifecycle {
    cap: usize,
    max_chars: usize,
    /// Oldest first.
    floating: Vec<FloatingOrb>,
    resolved: HashMap<OrbId, OrbState>,
}

impl OrbLifecycle {
    pub fn new(cap: usize, max_chars: usize) -> Self {
        Self {
            cap,
            max_chars,
            floating: Vec::new(),
            resolved: HashMap::new(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_floating_orbs, config.max_thought_chars)
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Creates a floating orb from raw user text.
    ///
    /// # Errors
    /// - `EmptyText` / `TooLong` when the normalized text is unusable.
    /// - `CapacityExceeded` when the board is full.
    pub fn spawn(&mut self, raw_text: &str, created_at: i64) -> OrbResult<OrbId> {
        let text = normalize_thought_text(raw_text).ok_or(OrbError::EmptyText)?;
        let actual = text.chars().count();
        if actual > self.max_chars {
            return Err(OrbError::TooLong {
                max: self.max_chars,
                actual,
            });
        }
        if self.floating.len() >= self.cap {
            return Err(OrbError::CapacityExceeded { cap: self.cap });
        }

        let orb = ThoughtOrb::new(text, created_at);
        let id = orb.id;
        self.floating.push(FloatingOrb {
            orb,
            dragging: false,
        });
        Ok(id)
    }

    /// Marks a floating orb as being dragged. Repeated calls are accepted.
    pub fn begin_drag(&mut self, id: OrbId) -> OrbResult<()> {
        let index = self.floating_index(id).map_err(|err| match err {
            OrbError::AlreadyResolved(id) => OrbError::NotFloating(id),
            other => other,
        })?;
        self.floating[index].dragging = true;
        Ok(())
    }

    /// Returns the orb if it is floating and currently dragged.
    pub fn ensure_dragging(&self, id: OrbId) -> OrbResult<&ThoughtOrb> {
        let entry = &self.floating[self.floating_index(id)?];
        if !entry.dragging {
            return Err(OrbError::NotDragging(id));
        }
        Ok(&entry.orb)
    }

    /// Ends a drag, sorting the orb when `target` is set.
    pub fn end_drag(
        &mut self,
        id: OrbId,
        target: Option<Bucket>,
        sorted_at: i64,
    ) -> OrbResult<DragOutcome> {
        self.ensure_dragging(id)?;
        let index = self.floating_index(id)?;

        let Some(bucket) = target else {
            self.floating[index].dragging = false;
            return Ok(DragOutcome::Cancelled);
        };

        let entry = self.floating.remove(index);
        self.resolved.insert(id, OrbState::Sorted(bucket));
        Ok(DragOutcome::Sorted(SortedThought::from_orb(
            &entry.orb, bucket, sorted_at,
        )))
    }

    /// Moves a floating orb straight to `Stolen`, dragged or not.
    pub fn remove_by_theft(&mut self, id: OrbId) -> OrbResult<ThoughtOrb> {
        let index = self.floating_index(id)?;
        let entry = self.floating.remove(index);
        self.resolved.insert(id, OrbState::Stolen);
        Ok(entry.orb)
    }

    /// Floating orb IDs, oldest first.
    pub fn floating_orbs(&self) -> Vec<OrbId> {
        self.floating.iter().map(|entry| entry.orb.id).collect()
    }

    pub fn floating_count(&self) -> usize {
        self.floating.len()
    }

    /// Returns a floating orb by ID.
    pub fn orb(&self, id: OrbId) -> Option<&ThoughtOrb> {
        self.floating
            .iter()
            .find(|entry| entry.orb.id == id)
            .map(|entry| &entry.orb)
    }

    /// Current state of any orb seen in this session.
    pub fn state(&self, id: OrbId) -> Option<OrbState> {
        if let Some(entry) = self.floating.iter().find(|entry| entry.orb.id == id) {
            return Some(OrbState::Floating {
                dragging: entry.dragging,
            });
        }
        self.resolved.get(&id).copied()
    }

    /// Forgets every orb. Used when a session restarts.
    pub fn clear(&mut self) {
        self.floating.clear();
        self.resolved.clear();
    }

    fn floating_index(&self, id: OrbId) -> OrbResult<usize> {
        if let Some(index) = self.floating.iter().position(|entry| entry.orb.id == id) {
            return Ok(index);
        }
        if self.resolved.contains_key(&id) {
            return Err(OrbError::AlreadyResolved(id));
        }
        Err(OrbError::NotFound(id))
    }
}
