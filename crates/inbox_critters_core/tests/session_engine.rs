use inbox_critters_core::{
    Bucket, GameConfig, InMemoryHistoryStore, InputEvent, ManualClock, OrbError, OrbState,
    SequenceRandom, SessionEngine, SessionError, SessionEvent, SortedThought,
};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use uuid::Uuid;

struct Harness {
    engine: SessionEngine<InMemoryHistoryStore>,
    store: InMemoryHistoryStore,
    events: Receiver<SessionEvent>,
    clock: ManualClock,
}

impl Harness {
    fn drain(&self) -> Vec<SessionEvent> {
        self.events.try_iter().collect()
    }
}

fn harness_with(config: GameConfig, store: InMemoryHistoryStore, random: Vec<u64>) -> Harness {
    let (tx, rx) = mpsc::channel();
    let clock = ManualClock::new(1_700_000_000_000);
    let engine = SessionEngine::start(store.clone(), config)
        .unwrap()
        .with_random(SequenceRandom::new(random))
        .with_clock(clock.clone())
        .with_sink(tx);
    Harness {
        engine,
        store,
        events: rx,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(GameConfig::default(), InMemoryHistoryStore::new(), vec![0])
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

#[test]
fn sorting_a_thought_records_history() {
    let mut h = harness();
    let id = h.engine.submit_thought("Buy milk").unwrap();
    h.engine.begin_drag(id).unwrap();
    h.engine.end_drag(id, Some(Bucket::Normal)).unwrap();

    let normal = h.engine.history(Some(Bucket::Normal));
    assert_eq!(normal.len(), 1);
    assert_eq!(normal[0].text, "Buy milk");
    assert!(h.engine.history(Some(Bucket::High)).is_empty());

    let counters = h.engine.counters();
    assert_eq!(counters.total_sorted, 1);
    assert_eq!(counters.session_sorted, 1);
    assert_eq!(h.store.len(), 1);

    assert_eq!(
        h.drain(),
        vec![
            SessionEvent::OrbSpawned {
                id,
                text: "Buy milk".to_string()
            },
            SessionEvent::OrbSorted {
                id,
                bucket: Bucket::Normal
            },
            SessionEvent::BoardCleared,
        ]
    );
}

#[test]
fn cancelled_drop_keeps_orb_on_board() {
    let mut h = harness();
    let id = h.engine.submit_thought("maybe later").unwrap();
    h.engine.begin_drag(id).unwrap();
    h.engine.drag_move(id).unwrap();
    h.engine.end_drag(id, None).unwrap();

    assert_eq!(
        h.engine.orb_state(id),
        Some(OrbState::Floating { dragging: false })
    );
    assert_eq!(h.engine.counters().total_sorted, 0);
    assert!(matches!(
        h.engine.drag_move(id),
        Err(SessionError::Orb(OrbError::NotDragging(_)))
    ));
}

#[test]
fn full_board_rejects_submissions_and_emits_event() {
    let mut h = harness();
    for index in 0..8 {
        h.engine.submit_thought(&format!("thought {index}")).unwrap();
    }
    h.drain();

    let err = h.engine.submit_thought("one too many").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Orb(OrbError::CapacityExceeded { cap: 8 })
    ));
    assert_eq!(h.engine.floating_orbs().len(), 8);
    assert_eq!(h.drain(), vec![SessionEvent::CapacityRejected { cap: 8 }]);
}

#[test]
fn blank_submission_is_rejected_without_events() {
    let mut h = harness();
    assert!(matches!(
        h.engine.submit_thought("   \n "),
        Err(SessionError::Orb(OrbError::EmptyText))
    ));
    assert!(h.drain().is_empty());
}

#[test]
fn first_critter_arrives_after_four_seconds() {
    let mut h = harness();
    h.engine.on_tick(Duration::from_millis(3_999));
    assert!(h.engine.active_critters().is_empty());

    h.engine.on_tick(Duration::from_millis(1));
    let critters = h.engine.active_critters();
    assert_eq!(critters.len(), 1);
    assert_eq!(critters[0].spawned_at, secs(4));
    assert!(matches!(
        h.drain().as_slice(),
        [SessionEvent::CritterSpawned { .. }]
    ));
}

#[test]
fn expired_deadline_steals_the_only_floating_orb() {
    let config = GameConfig {
        critter_interval_min_ms: 60_000,
        critter_interval_max_ms: 60_000,
        ..GameConfig::default()
    };
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0]);
    let id = h.engine.submit_thought("Renew passport").unwrap();

    h.engine.on_tick(secs(4));
    let critter = h.engine.active_critters()[0].id;
    h.engine.on_tick(secs(7));
    assert_eq!(h.engine.orb_state(id), Some(OrbState::Floating { dragging: false }));

    h.engine.on_tick(secs(1));
    assert_eq!(h.engine.orb_state(id), Some(OrbState::Stolen));
    assert_eq!(h.engine.counters().stolen_count, 1);
    assert!(h.engine.history(None).is_empty());
    assert!(h.engine.active_critters().is_empty());

    let events = h.drain();
    assert!(events.contains(&SessionEvent::OrbStolen { id, by: critter }));
    assert_eq!(events.last(), Some(&SessionEvent::BoardCleared));
}

#[test]
fn shooed_critter_never_steals() {
    let mut h = harness();
    let orb = h.engine.submit_thought("Water plants").unwrap();
    h.engine.on_tick(secs(4));
    let critter = h.engine.active_critters()[0].id;

    h.engine.shoo_critter(critter).unwrap();
    h.engine.on_tick(secs(5));

    assert_eq!(h.engine.counters().stolen_count, 0);
    assert_eq!(h.engine.counters().shooed_count, 1);
    assert_eq!(h.engine.orb_state(orb), Some(OrbState::Floating { dragging: false }));
    assert!(h.drain().contains(&SessionEvent::CritterShooed { id: critter }));
    assert!(h.engine.shoo_critter(critter).is_err());
}

#[test]
fn deadline_with_empty_board_only_removes_the_critter() {
    let config = GameConfig {
        critter_interval_min_ms: 60_000,
        critter_interval_max_ms: 60_000,
        ..GameConfig::default()
    };
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0]);
    h.engine.on_tick(secs(4));
    let critter = h.engine.active_critters()[0].id;
    h.engine.on_tick(secs(8));

    assert!(h.engine.active_critters().is_empty());
    assert_eq!(h.engine.counters().stolen_count, 0);
    let events = h.drain();
    assert_eq!(events.last(), Some(&SessionEvent::CritterDeparted { id: critter }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, SessionEvent::OrbStolen { .. })));
}

#[test]
fn critters_patrol_concurrently_with_independent_deadlines() {
    let config = GameConfig {
        critter_interval_min_ms: 6_000,
        critter_interval_max_ms: 6_000,
        ..GameConfig::default()
    };
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0]);
    for text in ["a", "b", "c"] {
        h.engine.submit_thought(text).unwrap();
    }

    // Spawns at 4s and 10s; first deadline at 12s.
    h.engine.on_tick(secs(11));
    assert_eq!(h.engine.active_critters().len(), 2);

    h.engine.on_tick(secs(1));
    assert_eq!(h.engine.active_critters().len(), 1);
    assert_eq!(h.engine.counters().stolen_count, 1);
    assert_eq!(h.engine.floating_orbs().len(), 2);
}

#[test]
fn long_tick_fires_timers_in_order_with_deadline_before_spawn() {
    let config = GameConfig {
        critter_interval_min_ms: 8_000,
        critter_interval_max_ms: 8_000,
        ..GameConfig::default()
    };
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0]);
    let orb = h.engine.submit_thought("single").unwrap();
    h.drain();

    // Spawn at 4s, deadline and second spawn both at 12s.
    h.engine.on_tick(secs(12));
    let events = h.drain();
    assert_eq!(events.len(), 4, "{events:?}");
    assert!(matches!(events[0], SessionEvent::CritterSpawned { .. }));
    assert!(matches!(events[1], SessionEvent::OrbStolen { id, .. } if id == orb));
    assert_eq!(events[2], SessionEvent::BoardCleared);
    assert!(matches!(events[3], SessionEvent::CritterSpawned { .. }));
    assert_eq!(h.engine.session_time(), secs(12));
}

#[test]
fn steal_target_comes_from_the_random_source() {
    let config = GameConfig {
        critter_interval_min_ms: 60_000,
        critter_interval_max_ms: 60_000,
        ..GameConfig::default()
    };
    // Critter kind, spawn delay, then steal target index 2.
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0, 0, 2]);
    let ids: Vec<_> = ["first", "second", "third"]
        .into_iter()
        .map(|text| h.engine.submit_thought(text).unwrap())
        .collect();

    h.engine.on_tick(secs(12));

    assert_eq!(h.engine.orb_state(ids[2]), Some(OrbState::Stolen));
    for id in &ids[..2] {
        assert_eq!(
            h.engine.orb_state(*id),
            Some(OrbState::Floating { dragging: false })
        );
    }
    assert_eq!(h.engine.floating_orbs(), ids[..2].to_vec());
}

#[test]
fn oversized_tick_is_clamped_to_the_configured_limit() {
    let mut h = harness();

    h.engine.on_tick(Duration::MAX);
    assert_eq!(h.engine.session_time(), secs(60));

    // Spawns every 6s from 4s to 58s; the last one is still patrolling.
    let events = h.drain();
    let spawned = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::CritterSpawned { .. }))
        .count();
    let departed = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::CritterDeparted { .. }))
        .count();
    assert_eq!(spawned, 10);
    assert_eq!(departed, 9);
    assert_eq!(h.engine.active_critters().len(), 1);

    h.engine.on_tick(Duration::MAX);
    assert_eq!(h.engine.session_time(), secs(120));
}

#[test]
fn sort_before_deadline_in_same_frame_wins() {
    let config = GameConfig {
        critter_interval_min_ms: 60_000,
        critter_interval_max_ms: 60_000,
        ..GameConfig::default()
    };
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0]);
    let id = h.engine.submit_thought("contested").unwrap();
    h.engine.on_tick(secs(4));
    h.engine.begin_drag(id).unwrap();
    h.engine.on_tick(Duration::from_millis(7_999));
    h.drain();

    h.engine.end_drag(id, Some(Bucket::High)).unwrap();
    h.engine.on_tick(Duration::from_millis(1));

    let events = h.drain();
    let sorted = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::OrbSorted { .. }))
        .count();
    let stolen = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::OrbStolen { .. }))
        .count();
    assert_eq!((sorted, stolen), (1, 0));
    assert_eq!(h.engine.orb_state(id), Some(OrbState::Sorted(Bucket::High)));
    assert_eq!(h.engine.counters().stolen_count, 0);
}

#[test]
fn steal_before_drop_in_same_frame_wins() {
    let config = GameConfig {
        critter_interval_min_ms: 60_000,
        critter_interval_max_ms: 60_000,
        ..GameConfig::default()
    };
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0]);
    let id = h.engine.submit_thought("contested").unwrap();
    h.engine.on_tick(secs(4));
    h.engine.begin_drag(id).unwrap();
    h.engine.on_tick(secs(8));

    let err = h.engine.end_drag(id, Some(Bucket::High)).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Orb(OrbError::AlreadyResolved(orb)) if orb == id
    ));
    assert_eq!(h.engine.orb_state(id), Some(OrbState::Stolen));
    assert_eq!(h.engine.counters().total_sorted, 0);
    assert!(h.store.is_empty());

    let sorted = h
        .drain()
        .iter()
        .filter(|event| matches!(event, SessionEvent::OrbSorted { .. }))
        .count();
    assert_eq!(sorted, 0);
}

#[test]
fn counters_are_stable_without_mutation() {
    let mut h = harness();
    let id = h.engine.submit_thought("stable").unwrap();
    h.engine.begin_drag(id).unwrap();
    h.engine.end_drag(id, Some(Bucket::Someday)).unwrap();

    let first = h.engine.counters();
    assert_eq!(h.engine.counters(), first);
    assert_eq!(h.engine.counters(), first);
}

#[test]
fn history_is_newest_first_with_ties_by_latest_append() {
    let mut h = harness();
    let sort = |h: &mut Harness, text: &str, bucket: Bucket| {
        let id = h.engine.submit_thought(text).unwrap();
        h.engine.begin_drag(id).unwrap();
        h.engine.end_drag(id, Some(bucket)).unwrap();
    };

    sort(&mut h, "first", Bucket::High);
    sort(&mut h, "second", Bucket::Normal);
    h.clock.advance(1_000);
    sort(&mut h, "third", Bucket::High);

    let texts: Vec<_> = h
        .engine
        .history(None)
        .into_iter()
        .map(|record| record.text)
        .collect();
    assert_eq!(texts, vec!["third", "second", "first"]);

    let high: Vec<_> = h
        .engine
        .history(Some(Bucket::High))
        .into_iter()
        .map(|record| record.text)
        .collect();
    assert_eq!(high, vec!["third", "first"]);
}

#[test]
fn seeded_history_counts_toward_total_but_not_session() {
    let previous = vec![
        SortedThought {
            id: Uuid::new_v4(),
            text: "old one".to_string(),
            bucket: Bucket::MostImportant,
            timestamp: 1,
        },
        SortedThought {
            id: Uuid::new_v4(),
            text: "old two".to_string(),
            bucket: Bucket::Normal,
            timestamp: 2,
        },
    ];
    let store = InMemoryHistoryStore::with_records(previous);
    let mut h = harness_with(GameConfig::default(), store, vec![0]);

    assert_eq!(h.engine.counters().total_sorted, 2);
    assert_eq!(h.engine.counters().session_sorted, 0);

    let id = h.engine.submit_thought("new").unwrap();
    h.engine.begin_drag(id).unwrap();
    h.engine.end_drag(id, Some(Bucket::Normal)).unwrap();

    assert_eq!(h.engine.counters().total_sorted, 3);
    assert_eq!(h.engine.counters().session_sorted, 1);
    assert_eq!(h.engine.bucket_counts().get(Bucket::Normal), 2);
    assert_eq!(h.engine.session_summary().sorted.get(Bucket::Normal), 1);
    assert_eq!(h.store.len(), 3);
}

#[test]
fn handle_input_dispatches_presentation_events() {
    let mut h = harness();
    h.engine
        .handle_input(InputEvent::SubmitThought {
            text: "via input".to_string(),
        })
        .unwrap();
    let id = h.engine.floating_orbs()[0];

    h.engine.handle_input(InputEvent::DragStart { id }).unwrap();
    h.engine.handle_input(InputEvent::DragMove { id }).unwrap();
    h.engine
        .handle_input(InputEvent::DragEnd {
            id,
            bucket: Some(Bucket::MostImportant),
        })
        .unwrap();

    assert_eq!(h.engine.history(Some(Bucket::MostImportant)).len(), 1);
    assert!(matches!(
        h.engine.handle_input(InputEvent::CritterTapped { id: Uuid::new_v4() }),
        Err(SessionError::Critter(_))
    ));
}

#[test]
fn end_cancels_timers_and_rejects_mutations() {
    let mut h = harness();
    h.engine.submit_thought("left behind").unwrap();
    h.engine.on_tick(secs(4));
    h.engine.end();
    h.drain();

    h.engine.on_tick(secs(120));
    assert!(h.drain().is_empty());
    assert_eq!(h.engine.counters().stolen_count, 0);
    assert!(!h.engine.is_running());
    assert!(matches!(
        h.engine.submit_thought("after end"),
        Err(SessionError::SessionEnded)
    ));
}

#[test]
fn restart_resets_session_counters_but_keeps_history() {
    let config = GameConfig {
        critter_interval_min_ms: 60_000,
        critter_interval_max_ms: 60_000,
        ..GameConfig::default()
    };
    let mut h = harness_with(config, InMemoryHistoryStore::new(), vec![0]);
    let kept = h.engine.submit_thought("kept").unwrap();
    h.engine.begin_drag(kept).unwrap();
    h.engine.end_drag(kept, Some(Bucket::High)).unwrap();
    h.engine.submit_thought("stolen").unwrap();
    h.engine.on_tick(secs(12));
    assert_eq!(h.engine.counters().stolen_count, 1);

    h.engine.end();
    h.engine.restart();

    let counters = h.engine.counters();
    assert_eq!(counters.total_sorted, 1);
    assert_eq!(counters.session_sorted, 0);
    assert_eq!(counters.stolen_count, 0);
    assert!(h.engine.floating_orbs().is_empty());
    assert_eq!(h.engine.session_time(), Duration::ZERO);

    h.drain();
    h.engine.on_tick(secs(4));
    assert!(matches!(
        h.drain().as_slice(),
        [SessionEvent::CritterSpawned { .. }]
    ));
}

#[test]
fn invalid_config_is_rejected_at_start() {
    let config = GameConfig {
        max_floating_orbs: 0,
        ..GameConfig::default()
    };
    let result = SessionEngine::start(InMemoryHistoryStore::new(), config);
    assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
}
