//! Tunable game rules.
//!
//! # Responsibility
//! - Carry caps and timer constants with their defaults.
//! - Reject configurations the scheduler cannot run.
//!
//! # Invariants
//! - A validated config has a non-zero cap, steal deadline and minimum
//!   critter interval, and `critter_interval_min_ms <= critter_interval_max_ms`.
//! - A validated config has a non-zero tick limit, so one `on_tick` call
//!   fires a bounded number of timers.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_MAX_FLOATING_ORBS: usize = 8;
pub const DEFAULT_FIRST_CRITTER_DELAY_MS: u64 = 4_000;
pub const DEFAULT_CRITTER_INTERVAL_MIN_MS: u64 = 6_000;
pub const DEFAULT_CRITTER_INTERVAL_MAX_MS: u64 = 12_000;
pub const DEFAULT_STEAL_DEADLINE_MS: u64 = 8_000;
pub const DEFAULT_MAX_THOUGHT_CHARS: usize = 280;
pub const DEFAULT_MAX_TICK_MS: u64 = 60_000;

/// Config validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroOrbCap,
    ZeroStealDeadline,
    ZeroThoughtLength,
    ZeroCritterInterval,
    ZeroTickLimit,
    InvertedCritterInterval { min_ms: u64, max_ms: u64 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroOrbCap => write!(f, "max_floating_orbs must be at least 1"),
            Self::ZeroStealDeadline => write!(f, "steal_deadline_ms must be greater than 0"),
            Self::ZeroThoughtLength => write!(f, "max_thought_chars must be at least 1"),
            Self::ZeroCritterInterval => {
                write!(f, "critter_interval_min_ms must be greater than 0")
            }
            Self::ZeroTickLimit => write!(f, "max_tick_ms must be greater than 0"),
            Self::InvertedCritterInterval { min_ms, max_ms } => write!(
                f,
                "critter_interval_min_ms ({min_ms}) must be <= critter_interval_max_ms ({max_ms})"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Rule constants for one session.
///
/// Missing fields fall back to defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Floating orbs allowed on the board at once.
    pub max_floating_orbs: usize,
    pub first_critter_delay_ms: u64,
    pub critter_interval_min_ms: u64,
    pub critter_interval_max_ms: u64,
    /// Time between a critter starting its patrol and its steal attempt.
    pub steal_deadline_ms: u64,
    pub max_thought_chars: usize,
    /// Longest span of session time a single tick may advance. Longer
    /// ticks are clamped.
    pub max_tick_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_floating_orbs: DEFAULT_MAX_FLOATING_ORBS,
            first_critter_delay_ms: DEFAULT_FIRST_CRITTER_DELAY_MS,
            critter_interval_min_ms: DEFAULT_CRITTER_INTERVAL_MIN_MS,
            critter_interval_max_ms: DEFAULT_CRITTER_INTERVAL_MAX_MS,
            steal_deadline_ms: DEFAULT_STEAL_DEADLINE_MS,
            max_thought_chars: DEFAULT_MAX_THOUGHT_CHARS,
            max_tick_ms: DEFAULT_MAX_TICK_MS,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_floating_orbs == 0 {
            return Err(ConfigError::ZeroOrbCap);
        }
        if self.steal_deadline_ms == 0 {
            return Err(ConfigError::ZeroStealDeadline);
        }
        if self.max_thought_chars == 0 {
            return Err(ConfigError::ZeroThoughtLength);
        }
        if self.critter_interval_min_ms == 0 {
            return Err(ConfigError::ZeroCritterInterval);
        }
        if self.max_tick_ms == 0 {
            return Err(ConfigError::ZeroTickLimit);
        }
        if self.critter_interval_min_ms > self.critter_interval_max_ms {
            return Err(ConfigError::InvertedCritterInterval {
                min_ms: self.critter_interval_min_ms,
                max_ms: self.critter_interval_max_ms,
            });
        }
        Ok(())
    }

    pub fn first_critter_delay(&self) -> Duration {
        Duration::from_millis(self.first_critter_delay_ms)
    }

    pub fn critter_interval_min(&self) -> Duration {
        Duration::from_millis(self.critter_interval_min_ms)
    }

    pub fn critter_interval_max(&self) -> Duration {
        Duration::from_millis(self.critter_interval_max_ms)
    }

    pub fn steal_deadline(&self) -> Duration {
        Duration::from_millis(self.steal_deadline_ms)
    }

    pub fn max_tick(&self) -> Duration {
        Duration::from_millis(self.max_tick_ms)
    }
}
