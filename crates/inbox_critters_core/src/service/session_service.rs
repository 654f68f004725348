//! Session engine.
//!
//! # Responsibility
//! - Own orb and critter state for one play session.
//! - Translate presentation input into state transitions and domain events.
//! - Advance critter timers on the cooperative `on_tick` pump.
//! - Append sorted thoughts to the history store and serve read-only views.
//!
//! # Invariants
//! - `counters().total_sorted` equals the history store size.
//! - Every orb resolves once; the losing side of a sort/steal race gets
//!   `AlreadyResolved` and produces no event.
//! - After `end()` no timer fires and every mutation returns `SessionEnded`.
//! - Thought text never reaches log output.

use crate::game::clock::{Clock, SystemClock};
use crate::game::config::{ConfigError, GameConfig};
use crate::game::critters::{CritterError, CritterSpawner, CritterTimer};
use crate::game::events::{EventSink, InputEvent, NullSink, SessionEvent};
use crate::game::orbs::{DragOutcome, OrbError, OrbLifecycle};
use crate::game::random::{RandomSource, StdRandom};
use crate::model::bucket::{Bucket, BucketCounts};
use crate::model::counters::{SessionCounters, SessionSummary};
use crate::model::critter::{Critter, CritterId};
use crate::model::orb::{OrbId, OrbState};
use crate::model::thought::SortedThought;
use crate::repo::history_repo::{HistoryStore, StoreError};
use log::{debug, error, info, warn};
use parking_lot::{Mutex, MutexGuard};
use std::cmp::Reverse;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

pub type SessionResult<T> = Result<T, SessionError>;

/// Session-level error. Every variant is recoverable.
#[derive(Debug)]
pub enum SessionError {
    Orb(OrbError),
    Critter(CritterError),
    Store(StoreError),
    InvalidConfig(ConfigError),
    /// The session was torn down with `end()`.
    SessionEnded,
}

impl SessionError {
    /// Stable code used in log lines and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Orb(err) => err.code(),
            Self::Critter(err) => err.code(),
            Self::Store(_) => "store_failed",
            Self::InvalidConfig(_) => "invalid_config",
            Self::SessionEnded => "session_ended",
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Orb(err) => write!(f, "{err}"),
            Self::Critter(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "history store failed: {err}"),
            Self::InvalidConfig(err) => write!(f, "invalid game config: {err}"),
            Self::SessionEnded => write!(f, "session has ended"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Orb(err) => Some(err),
            Self::Critter(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::InvalidConfig(err) => Some(err),
            Self::SessionEnded => None,
        }
    }
}

impl From<OrbError> for SessionError {
    fn from(value: OrbError) -> Self {
        Self::Orb(value)
    }
}

impl From<CritterError> for SessionError {
    fn from(value: CritterError) -> Self {
        Self::Critter(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}

/// Orchestrates one brain-dump session over a history store `H`.
pub struct SessionEngine<H: HistoryStore> {
    config: GameConfig,
    orbs: OrbLifecycle,
    critters: CritterSpawner,
    store: H,
    /// Mirror of the store contents in append order.
    history: Vec<SortedThought>,
    stolen_count: u64,
    shooed_count: u64,
    session_sorted: BucketCounts,
    session_time: Duration,
    running: bool,
    random: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    sink: Box<dyn EventSink>,
}

impl<H: HistoryStore> SessionEngine<H> {
    /// Validates `config`, loads history once and arms the first critter.
    ///
    /// Uses entropy-seeded randomness, the system clock and a discarding
    /// event sink until replaced with the `with_*` builders.
    pub fn start(store: H, config: GameConfig) -> SessionResult<Self> {
        config.validate()?;
        let history = store.load_all().map_err(|err| {
            error!(
                "event=session_start module=session status=error error_code=history_load_failed error={err}"
            );
            SessionError::from(err)
        })?;

        let mut critters = CritterSpawner::from_config(&config);
        critters.arm(Duration::ZERO);
        info!(
            "event=session_start module=session status=ok history_len={} max_floating_orbs={}",
            history.len(),
            config.max_floating_orbs
        );

        Ok(Self {
            orbs: OrbLifecycle::from_config(&config),
            critters,
            config,
            store,
            history,
            stolen_count: 0,
            shooed_count: 0,
            session_sorted: BucketCounts::default(),
            session_time: Duration::ZERO,
            running: true,
            random: Box::new(StdRandom::from_entropy()),
            clock: Box::new(SystemClock),
            sink: Box::new(NullSink),
        })
    }

    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Session time advanced so far through `on_tick`.
    pub fn session_time(&self) -> Duration {
        self.session_time
    }

    /// Creates a floating orb from user text.
    ///
    /// A full board emits `CapacityRejected` and returns
    /// `OrbError::CapacityExceeded`.
    pub fn submit_thought(&mut self, text: &str) -> SessionResult<OrbId> {
        self.ensure_running()?;
        let now = self.clock.now_epoch_ms();
        match self.orbs.spawn(text, now) {
            Ok(id) => {
                let text = self
                    .orbs
                    .orb(id)
                    .map(|orb| orb.text.clone())
                    .unwrap_or_default();
                info!(
                    "event=orb_spawned module=session status=ok orb_id={id} floating={}",
                    self.orbs.floating_count()
                );
                self.sink.emit(SessionEvent::OrbSpawned { id, text });
                Ok(id)
            }
            Err(OrbError::CapacityExceeded { cap }) => {
                info!(
                    "event=orb_spawn module=session status=rejected error_code=capacity_exceeded cap={cap}"
                );
                self.sink.emit(SessionEvent::CapacityRejected { cap });
                Err(OrbError::CapacityExceeded { cap }.into())
            }
            Err(err) => Err(self.rejected("orb_spawn", err.into())),
        }
    }

    pub fn begin_drag(&mut self, id: OrbId) -> SessionResult<()> {
        self.ensure_running()?;
        self.orbs
            .begin_drag(id)
            .map_err(|err| self.rejected("drag_start", err.into()))?;
        debug!("event=drag_start module=session status=ok orb_id={id}");
        Ok(())
    }

    /// Validates a drag move. Positions are view state and never reach core.
    pub fn drag_move(&mut self, id: OrbId) -> SessionResult<()> {
        self.ensure_running()?;
        match self.orbs.ensure_dragging(id) {
            Ok(_) => Ok(()),
            Err(err) => Err(self.rejected("drag_move", err.into())),
        }
    }

    /// Ends a drag; `Some(bucket)` sorts the orb, `None` cancels the drag.
    ///
    /// The record is appended to the history store before the orb leaves
    /// the board, so a store failure leaves the orb floating and dragged.
    pub fn end_drag(&mut self, id: OrbId, bucket: Option<Bucket>) -> SessionResult<DragOutcome> {
        self.ensure_running()?;
        let orb = match self.orbs.ensure_dragging(id) {
            Ok(orb) => orb.clone(),
            Err(err) => return Err(self.rejected("drag_end", err.into())),
        };

        let Some(bucket) = bucket else {
            let outcome = self.orbs.end_drag(id, None, 0)?;
            debug!("event=drag_end module=session status=ok orb_id={id} outcome=cancelled");
            return Ok(outcome);
        };

        let now = self.clock.now_epoch_ms();
        let record = SortedThought::from_orb(&orb, bucket, now);
        if let Err(err) = self.store.append(&record) {
            error!(
                "event=orb_sort module=session status=error error_code=history_append_failed orb_id={id} error={err}"
            );
            return Err(err.into());
        }

        let outcome = self.orbs.end_drag(id, Some(bucket), now)?;
        self.history.push(record);
        self.session_sorted.increment(bucket);
        info!(
            "event=orb_sorted module=session status=ok orb_id={id} bucket={bucket} total_sorted={}",
            self.history.len()
        );
        self.sink.emit(SessionEvent::OrbSorted { id, bucket });
        self.emit_if_board_cleared();
        Ok(outcome)
    }

    /// Shoos a patrolling critter before its deadline.
    pub fn shoo_critter(&mut self, id: CritterId) -> SessionResult<()> {
        self.ensure_running()?;
        self.critters
            .shoo(id)
            .map_err(|err| self.rejected("critter_shoo", err.into()))?;
        self.shooed_count += 1;
        info!(
            "event=critter_shooed module=session status=ok critter_id={id} shooed_count={}",
            self.shooed_count
        );
        self.sink.emit(SessionEvent::CritterShooed { id });
        Ok(())
    }

    /// Dispatches one presentation input event.
    pub fn handle_input(&mut self, input: InputEvent) -> SessionResult<()> {
        match input {
            InputEvent::SubmitThought { text } => self.submit_thought(&text).map(|_| ()),
            InputEvent::DragStart { id } => self.begin_drag(id),
            InputEvent::DragMove { id } => self.drag_move(id),
            InputEvent::DragEnd { id, bucket } => self.end_drag(id, bucket).map(|_| ()),
            InputEvent::CritterTapped { id } => self.shoo_critter(id),
        }
    }

    /// Advances session time by `elapsed`, firing every due timer in order.
    ///
    /// `elapsed` is clamped to `GameConfig::max_tick_ms`. No-op once the
    /// session has ended.
    pub fn on_tick(&mut self, elapsed: Duration) {
        if !self.running {
            return;
        }
        let limit = self.config.max_tick();
        if elapsed > limit {
            debug!(
                "event=tick_clamped module=session status=ok elapsed_ms={} limit_ms={}",
                elapsed.as_millis(),
                limit.as_millis()
            );
        }
        let target = self.session_time.saturating_add(elapsed.min(limit));
        while let Some(timer) = self.critters.next_due(target) {
            self.session_time = timer.at();
            match timer {
                CritterTimer::Spawn { .. } => self.spawn_critter(),
                CritterTimer::StealDeadline { critter, .. } => self.attempt_steal(critter),
            }
        }
        self.session_time = target;
    }

    /// Counter snapshot. Pure read.
    pub fn counters(&self) -> SessionCounters {
        SessionCounters {
            total_sorted: self.history.len() as u64,
            stolen_count: self.stolen_count,
            session_sorted: self.session_sorted.total(),
            shooed_count: self.shooed_count,
        }
    }

    /// Sorted thoughts, newest first, optionally filtered by bucket.
    ///
    /// Equal timestamps list the later append first.
    pub fn history(&self, bucket: Option<Bucket>) -> Vec<SortedThought> {
        let mut entries: Vec<(usize, &SortedThought)> = self
            .history
            .iter()
            .enumerate()
            .filter(|(_, record)| bucket.map_or(true, |bucket| record.bucket == bucket))
            .collect();
        entries.sort_by_key(|(seq, record)| (Reverse(record.timestamp), Reverse(*seq)));
        entries.into_iter().map(|(_, record)| record.clone()).collect()
    }

    /// Per-bucket totals across the whole history.
    pub fn bucket_counts(&self) -> BucketCounts {
        let mut counts = BucketCounts::default();
        for record in &self.history {
            counts.increment(record.bucket);
        }
        counts
    }

    /// Per-bucket results of the current session.
    pub fn session_summary(&self) -> SessionSummary {
        SessionSummary {
            sorted: self.session_sorted,
            stolen: self.stolen_count,
            shooed: self.shooed_count,
        }
    }

    /// Floating orb IDs, oldest first.
    pub fn floating_orbs(&self) -> Vec<OrbId> {
        self.orbs.floating_orbs()
    }

    pub fn orb_state(&self, id: OrbId) -> Option<OrbState> {
        self.orbs.state(id)
    }

    /// Patrolling critters in spawn order.
    pub fn active_critters(&self) -> &[Critter] {
        self.critters.active()
    }

    /// Starts a fresh session on the same history.
    ///
    /// Floating orbs and critters are discarded without events, all timers
    /// are cancelled and the first critter is re-armed.
    pub fn restart(&mut self) {
        let dropped_critters = self.critters.cancel_all();
        let dropped_orbs = self.orbs.floating_count();
        self.orbs.clear();
        self.stolen_count = 0;
        self.shooed_count = 0;
        self.session_sorted = BucketCounts::default();
        self.session_time = Duration::ZERO;
        self.running = true;
        self.critters.arm(Duration::ZERO);
        info!(
            "event=session_restart module=session status=ok dropped_orbs={dropped_orbs} dropped_critters={dropped_critters} total_sorted={}",
            self.history.len()
        );
    }

    /// Tears the session down and cancels every pending timer.
    pub fn end(&mut self) {
        if !self.running {
            return;
        }
        let dropped_critters = self.critters.cancel_all();
        self.running = false;
        info!(
            "event=session_end module=session status=ok dropped_critters={dropped_critters} sorted={} stolen={} shooed={}",
            self.session_sorted.total(),
            self.stolen_count,
            self.shooed_count
        );
    }

    fn spawn_critter(&mut self) {
        let critter = self
            .critters
            .spawn(self.session_time, self.random.as_mut());
        info!(
            "event=critter_spawned module=session status=ok critter_id={} kind={:?} session_ms={} next_spawn_ms={:?}",
            critter.id,
            critter.kind,
            self.session_time.as_millis(),
            self.critters.next_spawn_at().map(|at| at.as_millis())
        );
        self.sink.emit(SessionEvent::CritterSpawned {
            id: critter.id,
            kind: critter.kind,
        });
    }

    fn attempt_steal(&mut self, critter_id: CritterId) {
        if let Err(err) = self.critters.resolve_deadline(critter_id) {
            warn!(
                "event=critter_steal module=session status=rejected critter_id={critter_id} error_code={}",
                err.code()
            );
            return;
        }

        let floating = self.orbs.floating_orbs();
        let Some(target) = CritterSpawner::choose_target(&floating, self.random.as_mut()) else {
            info!(
                "event=critter_departed module=session status=ok critter_id={critter_id} outcome=nothing_to_steal"
            );
            self.sink.emit(SessionEvent::CritterDeparted { id: critter_id });
            return;
        };

        match self.orbs.remove_by_theft(target) {
            Ok(_) => {
                self.stolen_count += 1;
                info!(
                    "event=orb_stolen module=session status=ok orb_id={target} critter_id={critter_id} stolen_count={}",
                    self.stolen_count
                );
                self.sink.emit(SessionEvent::OrbStolen {
                    id: target,
                    by: critter_id,
                });
                self.emit_if_board_cleared();
            }
            Err(err) => {
                debug!(
                    "event=critter_steal module=session status=rejected orb_id={target} critter_id={critter_id} error_code={}",
                    err.code()
                );
                self.sink.emit(SessionEvent::CritterDeparted { id: critter_id });
            }
        }
    }

    fn emit_if_board_cleared(&mut self) {
        if self.orbs.floating_count() == 0 {
            debug!("event=board_cleared module=session status=ok");
            self.sink.emit(SessionEvent::BoardCleared);
        }
    }

    fn ensure_running(&self) -> SessionResult<()> {
        if self.running {
            Ok(())
        } else {
            Err(SessionError::SessionEnded)
        }
    }

    fn rejected(&self, event: &str, err: SessionError) -> SessionError {
        debug!(
            "event={event} module=session status=rejected error_code={}",
            err.code()
        );
        err
    }
}

/// Thread-safe handle for hosts that drive input and timers from different
/// threads. All engine calls go through one coarse lock.
pub struct SharedSession<H: HistoryStore> {
    inner: Arc<Mutex<SessionEngine<H>>>,
}

impl<H: HistoryStore> Clone for SharedSession<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: HistoryStore> SharedSession<H> {
    pub fn new(engine: SessionEngine<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Locks the engine for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, SessionEngine<H>> {
        self.inner.lock()
    }

    /// Runs `f` with exclusive access to the engine.
    pub fn with<T>(&self, f: impl FnOnce(&mut SessionEngine<H>) -> T) -> T {
        let mut engine = self.inner.lock();
        f(&mut *engine)
    }
}
