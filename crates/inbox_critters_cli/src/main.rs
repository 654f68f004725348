//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `inbox_critters_core` linkage.
//! - Play one seeded headless session so output stays deterministic.

use inbox_critters_core::{
    Bucket, GameConfig, InMemoryHistoryStore, ManualClock, SessionEngine, SessionEvent, StdRandom,
};
use std::error::Error;
use std::sync::mpsc;
use std::time::Duration;

const SEED: u64 = 7;
const TICKS: u32 = 16;

fn main() -> Result<(), Box<dyn Error>> {
    println!("inbox_critters_core ping={}", inbox_critters_core::ping());
    println!(
        "inbox_critters_core version={}",
        inbox_critters_core::core_version()
    );

    let (tx, rx) = mpsc::channel();
    let mut engine = SessionEngine::start(InMemoryHistoryStore::new(), GameConfig::default())?
        .with_random(StdRandom::seeded(SEED))
        .with_clock(ManualClock::new(0))
        .with_sink(tx);

    let keep = engine.submit_thought("Buy milk")?;
    for text in ["Call the plumber", "Read that paper", "Water the plants"] {
        engine.submit_thought(text)?;
    }
    engine.begin_drag(keep)?;
    engine.end_drag(keep, Some(Bucket::Normal))?;

    let mut shoo_next = true;
    for tick in 1..=TICKS {
        engine.on_tick(Duration::from_secs(1));
        for event in rx.try_iter() {
            println!("t={tick:>2}s {event:?}");
            // Shoo every other critter so both outcomes show up.
            if let SessionEvent::CritterSpawned { id, .. } = event {
                if shoo_next {
                    if let Err(err) = engine.shoo_critter(id) {
                        println!("t={tick:>2}s shoo failed: {err}");
                    }
                }
                shoo_next = !shoo_next;
            }
        }
    }
    for event in rx.try_iter() {
        println!("t=end {event:?}");
    }

    let summary = engine.session_summary();
    for (bucket, count) in summary.sorted.iter() {
        println!("{} {:<15} {count}", bucket.icon(), bucket.label());
    }
    println!("stolen={} shooed={}", summary.stolen, summary.shooed);
    engine.end();
    Ok(())
}
