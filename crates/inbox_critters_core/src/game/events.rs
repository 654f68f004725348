//! Event contract between core and the presentation layer.
//!
//! # Responsibility
//! - Define outbound domain events (`SessionEvent`) and inbound input
//!   events (`InputEvent`).
//! - Define the push-style `EventSink` consumed by the session engine.
//!
//! # Invariants
//! - Events carry domain identifiers only, never visual handles.
//! - Exactly one resolution event (`OrbSorted` or `OrbStolen`) is emitted
//!   per orb.

use crate::model::bucket::Bucket;
use crate::model::critter::{CritterId, CritterKind};
use crate::model::orb::OrbId;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Domain events emitted by the session engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    OrbSpawned { id: OrbId, text: String },
    OrbSorted { id: OrbId, bucket: Bucket },
    OrbStolen { id: OrbId, by: CritterId },
    CritterSpawned { id: CritterId, kind: CritterKind },
    CritterShooed { id: CritterId },
    /// Critter left after its deadline without stealing anything.
    CritterDeparted { id: CritterId },
    CapacityRejected { cap: usize },
    /// The last floating orb was resolved.
    BoardCleared,
}

/// Input events forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    SubmitThought { text: String },
    DragStart { id: OrbId },
    DragMove { id: OrbId },
    /// `bucket` is `None` when the drop missed every bucket zone.
    DragEnd { id: OrbId, bucket: Option<Bucket> },
    CritterTapped { id: CritterId },
}

/// Single-consumer push target for session events.
pub trait EventSink: Send {
    fn emit(&mut self, event: SessionEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SessionEvent) {}
}

impl EventSink for Sender<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        // A dropped receiver only means nobody renders anymore.
        let _ = self.send(event);
    }
}
