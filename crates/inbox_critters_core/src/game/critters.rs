//! Critter spawner and stealer.
//!
//! # Responsibility
//! - Schedule critter spawns: a fixed first delay, then a random interval
//!   armed the moment each critter starts patrolling.
//! - Track each patrolling critter's steal deadline.
//! - Resolve critters by shoo or by deadline and pick steal targets.
//!
//! # Invariants
//! - At most one spawn timer is pending at any time.
//! - Several critters may patrol at once, each with its own deadline.
//! - Resolved critters are removed immediately and never fire again.
//! - `cancel_all` leaves no pending timer behind.
//! - Only the most recent `RESOLVED_MEMORY` resolved ids are remembered;
//!   older ids report `NotFound`.

use crate::game::config::GameConfig;
use crate::game::random::RandomSource;
use crate::model::critter::{Critter, CritterId, CritterKind, CritterPhase};
use crate::model::orb::OrbId;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type CritterResult<T> = Result<T, CritterError>;

/// Resolved critter ids kept for `AlreadyResolved` reporting.
pub const RESOLVED_MEMORY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CritterError {
    NotFound(CritterId),
    /// Critter was already shooed or already made its steal attempt.
    AlreadyResolved(CritterId),
}

impl CritterError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyResolved(_) => "already_resolved",
        }
    }
}

impl Display for CritterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "critter not found: {id}"),
            Self::AlreadyResolved(id) => write!(f, "critter already resolved: {id}"),
        }
    }
}

impl Error for CritterError {}

/// A timer that is due at `at` in session time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CritterTimer {
    Spawn { at: Duration },
    StealDeadline { critter: CritterId, at: Duration },
}

impl CritterTimer {
    pub fn at(self) -> Duration {
        match self {
            Self::Spawn { at } | Self::StealDeadline { at, .. } => at,
        }
    }
}

/// Owns every critter and critter timer of one session.
#[derive(Debug, Clone)]
pub struct CritterSpawner {
    first_delay: Duration,
    interval_min: Duration,
    interval_max: Duration,
    steal_deadline: Duration,
    next_spawn_at: Option<Duration>,
    /// Patrolling critters in spawn order.
    active: Vec<Critter>,
    /// Recently resolved ids, oldest first.
    resolved: VecDeque<CritterId>,
}

impl CritterSpawner {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            first_delay: config.first_critter_delay(),
            interval_min: config.critter_interval_min(),
            interval_max: config.critter_interval_max(),
            steal_deadline: config.steal_deadline(),
            next_spawn_at: None,
            active: Vec::new(),
            resolved: VecDeque::with_capacity(RESOLVED_MEMORY),
        }
    }

    /// Arms the first spawn timer relative to session start `now`.
    pub fn arm(&mut self, now: Duration) {
        self.next_spawn_at = Some(now + self.first_delay);
    }

    /// Drops every critter and pending timer. Returns removed critter count.
    pub fn cancel_all(&mut self) -> usize {
        let removed = self.active.len();
        self.next_spawn_at = None;
        self.active.clear();
        self.resolved.clear();
        removed
    }

    pub fn next_spawn_at(&self) -> Option<Duration> {
        self.next_spawn_at
    }

    /// Earliest timer due at or before `until`.
    ///
    /// At equal instants steal deadlines win over the spawn timer, and
    /// deadlines are ordered by spawn order.
    pub fn next_due(&self, until: Duration) -> Option<CritterTimer> {
        let deadline = self
            .active
            .iter()
            .filter_map(|critter| critter.steal_at().map(|at| (critter.id, at)))
            .filter(|(_, at)| *at <= until)
            .min_by_key(|(_, at)| *at)
            .map(|(critter, at)| CritterTimer::StealDeadline { critter, at });
        let spawn = self
            .next_spawn_at
            .filter(|at| *at <= until)
            .map(|at| CritterTimer::Spawn { at });

        match (deadline, spawn) {
            (Some(deadline), Some(spawn)) if spawn.at() < deadline.at() => Some(spawn),
            (Some(deadline), _) => Some(deadline),
            (None, spawn) => spawn,
        }
    }

    /// Spawns one critter at `now`, starts its patrol and arms the next
    /// spawn timer.
    pub fn spawn(&mut self, now: Duration, random: &mut dyn RandomSource) -> Critter {
        let kind = CritterKind::ALL[random.pick_index(CritterKind::ALL.len())];
        let mut critter = Critter::new(kind, now);
        critter.advance(CritterPhase::Patrolling {
            steal_at: now + self.steal_deadline,
        });

        let delay = random.delay_between(self.interval_min, self.interval_max);
        self.next_spawn_at = Some(now + delay);
        self.active.push(critter.clone());
        critter
    }

    /// Shoos a patrolling critter; it is removed without effect.
    pub fn shoo(&mut self, id: CritterId) -> CritterResult<Critter> {
        self.resolve(id, CritterPhase::Shooed)
    }

    /// Resolves a critter whose deadline fired. The caller performs the
    /// steal attempt.
    pub fn resolve_deadline(&mut self, id: CritterId) -> CritterResult<Critter> {
        self.resolve(id, CritterPhase::StealResolved)
    }

    /// Picks a steal target uniformly among `floating`.
    pub fn choose_target(floating: &[OrbId], random: &mut dyn RandomSource) -> Option<OrbId> {
        if floating.is_empty() {
            return None;
        }
        floating.get(random.pick_index(floating.len())).copied()
    }

    pub fn active(&self) -> &[Critter] {
        &self.active
    }

    pub fn critter(&self, id: CritterId) -> Option<&Critter> {
        self.active.iter().find(|critter| critter.id == id)
    }

    fn resolve(&mut self, id: CritterId, outcome: CritterPhase) -> CritterResult<Critter> {
        let Some(index) = self.active.iter().position(|critter| critter.id == id) else {
            if self.resolved.contains(&id) {
                return Err(CritterError::AlreadyResolved(id));
            }
            return Err(CritterError::NotFound(id));
        };

        let mut critter = self.active.remove(index);
        critter.advance(outcome);
        critter.advance(CritterPhase::Removed);
        if self.resolved.len() == RESOLVED_MEMORY {
            self.resolved.pop_front();
        }
        self.resolved.push_back(id);
        Ok(critter)
    }
}
