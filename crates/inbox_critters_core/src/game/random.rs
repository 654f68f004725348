//! Injectable randomness for critter kind, spawn delay and steal target.
//!
//! # Invariants
//! - `pick_index(len)` returns a value in `0..len` for `len > 0`.
//! - `delay_between(min, max)` returns a value in `min..=max` at millisecond
//!   resolution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Random decisions made by the session engine.
pub trait RandomSource: Send {
    /// Uniform index in `0..len`. `len` is always non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform delay in `min..=max`.
    fn delay_between(&mut self, min: Duration, max: Duration) -> Duration;
}

/// `StdRng`-backed source for real play.
#[derive(Debug)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for replays and soak tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }

    fn delay_between(&mut self, min: Duration, max: Duration) -> Duration {
        let min_ms = duration_ms(min);
        let max_ms = duration_ms(max).max(min_ms);
        Duration::from_millis(self.rng.gen_range(min_ms..=max_ms))
    }
}

/// Replays a fixed sequence of raw values, cycling when exhausted.
///
/// `pick_index` yields `value % len`; `delay_between` yields
/// `min + value % (span + 1)` milliseconds. An empty sequence always
/// yields `0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<u64>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    fn next_value(&mut self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl RandomSource for SequenceRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        let len = len.max(1) as u64;
        (self.next_value() % len) as usize
    }

    fn delay_between(&mut self, min: Duration, max: Duration) -> Duration {
        let min_ms = duration_ms(min);
        let span = duration_ms(max).saturating_sub(min_ms);
        let offset = self.next_value() % span.saturating_add(1);
        Duration::from_millis(min_ms + offset)
    }
}

fn duration_ms(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{RandomSource, SequenceRandom, StdRandom};
    use std::time::Duration;

    #[test]
    fn sequence_random_cycles_values() {
        let mut random = SequenceRandom::new(vec![1, 4]);
        assert_eq!(random.pick_index(3), 1);
        assert_eq!(random.pick_index(3), 1);
        assert_eq!(random.pick_index(3), 1);
    }

    #[test]
    fn sequence_random_maps_delay_into_range() {
        let mut random = SequenceRandom::new(vec![0, 6_000, 6_001]);
        let min = Duration::from_secs(6);
        let max = Duration::from_secs(12);
        assert_eq!(random.delay_between(min, max), min);
        assert_eq!(random.delay_between(min, max), max);
        assert_eq!(random.delay_between(min, max), min);
    }

    #[test]
    fn seeded_std_random_is_reproducible_and_in_range() {
        let mut first = StdRandom::seeded(7);
        let mut second = StdRandom::seeded(7);
        let min = Duration::from_secs(6);
        let max = Duration::from_secs(12);
        for _ in 0..64 {
            let delay = first.delay_between(min, max);
            assert!(delay >= min && delay <= max);
            assert_eq!(delay, second.delay_between(min, max));
            let index = first.pick_index(5);
            assert!(index < 5);
            assert_eq!(index, second.pick_index(5));
        }
    }
}
