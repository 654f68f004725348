//! Critter model.
//!
//! # Responsibility
//! - Define the timed adversary record and its kinds.
//! - Guard the per-critter phase machine.
//!
//! # Invariants
//! - Phases only move forward:
//!   `Spawned -> Patrolling -> (Shooed | StealResolved) -> Removed`.
//! - A critter is never bound to an orb before it resolves.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Stable identifier of a critter.
pub type CritterId = Uuid;

/// Visual species of a critter. Has no effect on rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CritterKind {
    Mouse,
    Mosquito,
    Worm,
}

impl CritterKind {
    pub const ALL: [CritterKind; 3] = [CritterKind::Mouse, CritterKind::Mosquito, CritterKind::Worm];

    pub fn icon(self) -> &'static str {
        match self {
            Self::Mouse => "🐭",
            Self::Mosquito => "🦟",
            Self::Worm => "🐛",
        }
    }
}

/// Phase of one critter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CritterPhase {
    Spawned,
    /// Roaming the board; a steal attempt happens at `steal_at`.
    Patrolling { steal_at: Duration },
    Shooed,
    StealResolved,
    Removed,
}

impl CritterPhase {
    fn can_advance_to(self, next: CritterPhase) -> bool {
        matches!(
            (self, next),
            (Self::Spawned, Self::Patrolling { .. })
                | (Self::Patrolling { .. }, Self::Shooed)
                | (Self::Patrolling { .. }, Self::StealResolved)
                | (Self::Shooed, Self::Removed)
                | (Self::StealResolved, Self::Removed)
        )
    }
}

/// Ephemeral adversary actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Critter {
    pub id: CritterId,
    pub kind: CritterKind,
    /// Session time at which the critter appeared.
    pub spawned_at: Duration,
    phase: CritterPhase,
}

impl Critter {
    pub fn new(kind: CritterKind, spawned_at: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            spawned_at,
            phase: CritterPhase::Spawned,
        }
    }

    pub fn phase(&self) -> CritterPhase {
        self.phase
    }

    /// Returns the steal deadline while patrolling.
    pub fn steal_at(&self) -> Option<Duration> {
        match self.phase {
            CritterPhase::Patrolling { steal_at } => Some(steal_at),
            _ => None,
        }
    }

    /// Moves to `next` if the phase machine allows it.
    ///
    /// Returns `false` and leaves the phase untouched otherwise.
    pub fn advance(&mut self, next: CritterPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            return false;
        }
        self.phase = next;
        true
    }
}
