//! Priority bucket catalog.
//!
//! # Responsibility
//! - Enumerate the four fixed priority buckets.
//! - Carry display metadata (label, glyph, color) for presentation layers.
//!
//! # Invariants
//! - Canonical order is `MostImportant, High, Normal, Someday`.
//! - Labels and glyphs are unique among the four buckets.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Linear RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// One of the four priority categories an orb can be sorted into.
///
/// Derived `Ord` follows declaration order, which is the canonical
/// rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Most important task.
    MostImportant,
    High,
    Normal,
    Someday,
}

impl Bucket {
    /// All buckets in canonical order.
    pub const ALL: [Bucket; 4] = [
        Bucket::MostImportant,
        Bucket::High,
        Bucket::Normal,
        Bucket::Someday,
    ];

    /// Iterates buckets in canonical order.
    pub fn iter() -> impl Iterator<Item = Bucket> {
        Self::ALL.into_iter()
    }

    /// Zero-based position in canonical order.
    pub fn index(self) -> usize {
        match self {
            Self::MostImportant => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Someday => 3,
        }
    }

    /// Looks up a bucket by canonical position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MostImportant => "MIT",
            Self::High => "High",
            Self::Normal => "Normal",
            Self::Someday => "Someday",
        }
    }

    /// Single-glyph icon shown on the bucket zone.
    pub fn icon(self) -> &'static str {
        match self {
            Self::MostImportant => "🔴",
            Self::High => "🟡",
            Self::Normal => "🟢",
            Self::Someday => "🔵",
        }
    }

    pub fn color(self) -> BucketColor {
        match self {
            Self::MostImportant => BucketColor {
                r: 0.90,
                g: 0.22,
                b: 0.22,
            },
            Self::High => BucketColor {
                r: 0.95,
                g: 0.75,
                b: 0.10,
            },
            Self::Normal => BucketColor {
                r: 0.22,
                g: 0.80,
                b: 0.38,
            },
            Self::Someday => BucketColor {
                r: 0.22,
                g: 0.55,
                b: 0.95,
            },
        }
    }

    /// Stable storage key (matches the serde representation).
    pub fn as_key(self) -> &'static str {
        match self {
            Self::MostImportant => "most_important",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Someday => "someday",
        }
    }

    /// Parses a storage key produced by [`Bucket::as_key`].
    pub fn from_key(value: &str) -> Option<Self> {
        match value {
            "most_important" => Some(Self::MostImportant),
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            "someday" => Some(Self::Someday),
            _ => None,
        }
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Per-bucket counters indexed in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts([u64; 4]);

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> u64 {
        self.0[bucket.index()]
    }

    pub fn increment(&mut self, bucket: Bucket) {
        self.0[bucket.index()] += 1;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Yields `(bucket, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, u64)> + '_ {
        Bucket::iter().map(move |bucket| (bucket, self.get(bucket)))
    }
}

#[cfg(test)]
mod tests {
    use super::{Bucket, BucketCounts};

    #[test]
    fn index_roundtrips_through_from_index() {
        for bucket in Bucket::iter() {
            assert_eq!(Bucket::from_index(bucket.index()), Some(bucket));
        }
        assert_eq!(Bucket::from_index(4), None);
    }

    #[test]
    fn key_parsing_rejects_unknown_values() {
        assert_eq!(Bucket::from_key("high"), Some(Bucket::High));
        assert_eq!(Bucket::from_key("urgent"), None);
    }

    #[test]
    fn counts_track_each_bucket_independently() {
        let mut counts = BucketCounts::default();
        counts.increment(Bucket::Normal);
        counts.increment(Bucket::Normal);
        counts.increment(Bucket::Someday);

        assert_eq!(counts.get(Bucket::Normal), 2);
        assert_eq!(counts.get(Bucket::MostImportant), 0);
        assert_eq!(counts.total(), 3);
    }
}
