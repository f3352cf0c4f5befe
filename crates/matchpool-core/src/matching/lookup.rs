//! Synchronous score sources consumed by the pairing engine

use std::collections::HashMap;

use crate::entities::PoolMember;
use crate::limits::NEUTRAL_COMPATIBILITY;
use crate::value_objects::Snowflake;

/// Predicted compatibility (0-100) of two pool members
pub trait CompatibilityLookup {
    fn compatibility(&self, a: &PoolMember, b: &PoolMember) -> f64;
}

/// Recent co-occurrence count of two members
pub trait HistoryLookup {
    fn pair_count(&self, a: Snowflake, b: Snowflake) -> u32;
}

/// Closures over user IDs
impl<F> CompatibilityLookup for F
where
    F: Fn(Snowflake, Snowflake) -> f64,
{
    fn compatibility(&self, a: &PoolMember, b: &PoolMember) -> f64 {
        self(a.user_id, b.user_id)
    }
}

/// Key for an unordered pair
#[inline]
pub fn pair_key(a: Snowflake, b: Snowflake) -> (Snowflake, Snowflake) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Prefetched user-pair scores; unknown pairs read as neutral
#[derive(Debug, Clone, Default)]
pub struct CompatibilityMatrix {
    scores: HashMap<(Snowflake, Snowflake), f64>,
}

impl CompatibilityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_a: Snowflake, user_b: Snowflake, score: f64) {
        self.scores.insert(pair_key(user_a, user_b), score);
    }

    pub fn get(&self, user_a: Snowflake, user_b: Snowflake) -> Option<f64> {
        self.scores.get(&pair_key(user_a, user_b)).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(Snowflake, Snowflake, f64)> for CompatibilityMatrix {
    fn from_iter<I: IntoIterator<Item = (Snowflake, Snowflake, f64)>>(iter: I) -> Self {
        let mut matrix = Self::new();
        for (a, b, score) in iter {
            matrix.insert(a, b, score);
        }
        matrix
    }
}

impl CompatibilityLookup for CompatibilityMatrix {
    fn compatibility(&self, a: &PoolMember, b: &PoolMember) -> f64 {
        self.get(a.user_id, b.user_id).unwrap_or(NEUTRAL_COMPATIBILITY)
    }
}

/// Co-occurrence counts keyed by unordered member pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairCounts {
    counts: HashMap<(Snowflake, Snowflake), u32>,
}

impl PairCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, a: Snowflake, b: Snowflake) {
        *self.counts.entry(pair_key(a, b)).or_insert(0) += 1;
    }

    pub fn get(&self, a: Snowflake, b: Snowflake) -> u32 {
        self.counts.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl HistoryLookup for PairCounts {
    fn pair_count(&self, a: Snowflake, b: Snowflake) -> u32 {
        self.get(a, b)
    }
}
