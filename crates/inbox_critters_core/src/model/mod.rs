//! Domain model for the brain-dump board.
//!
//! # Responsibility
//! - Define the value types shared by the orb, critter and session layers.
//! - Keep presentation concerns (positions, nodes, animation) out of core.
//!
//! # Invariants
//! - Every orb and critter is identified by a stable UUID.
//! - `SortedThought` records are immutable once created.

pub mod bucket;
pub mod counters;
pub mod critter;
pub mod orb;
pub mod thought;
