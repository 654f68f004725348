//! Core game logic for Inbox Critters.
//! This crate is the single source of truth for board rules: orb lifecycle,
//! critter timing, scoring and the sorted-thought ledger.

pub mod db;
pub mod game;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use game::clock::{Clock, ManualClock, SystemClock};
pub use game::config::{ConfigError, GameConfig};
pub use game::critters::{CritterError, CritterResult, CritterSpawner, CritterTimer};
pub use game::events::{EventSink, InputEvent, NullSink, SessionEvent};
pub use game::orbs::{DragOutcome, OrbError, OrbLifecycle, OrbResult};
pub use game::random::{RandomSource, SequenceRandom, StdRandom};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bucket::{Bucket, BucketColor, BucketCounts};
pub use model::counters::{SessionCounters, SessionSummary};
pub use model::critter::{Critter, CritterId, CritterKind, CritterPhase};
pub use model::orb::{OrbId, OrbState, ThoughtOrb};
pub use model::thought::SortedThought;
pub use repo::history_repo::{
    HistoryStore, InMemoryHistoryStore, SqliteHistoryStore, StoreError, StoreResult,
};
pub use service::session_service::{SessionEngine, SessionError, SessionResult, SharedSession};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
