//! Game rules: orb lifecycle, critter scheduling and their collaborators.
//!
//! # Responsibility
//! - Hold rule-level state machines independent of any rendering layer.
//! - Expose injectable randomness and clock seams for deterministic tests.
//!
//! # Invariants
//! - Nothing in this module performs I/O.
//! - All timing is expressed in session time advanced by the caller.

pub mod clock;
pub mod config;
pub mod critters;
pub mod events;
pub mod orbs;
pub mod random;
