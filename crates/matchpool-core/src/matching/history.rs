//! Recency-window pairing history
//!
//! Rebuilt from stored `MatchResult`s before each round.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::entities::MatchResult;
use crate::value_objects::Snowflake;

use super::lookup::PairCounts;

#[derive(Debug, Clone)]
struct Occurrence {
    at: DateTime<Utc>,
    members: Vec<Snowflake>,
}

impl Occurrence {
    fn contains_pair(&self, a: Snowflake, b: Snowflake) -> bool {
        self.members.contains(&a) && self.members.contains(&b)
    }
}

/// Per-pool record of which members were grouped together, and when
#[derive(Debug, Clone, Default)]
pub struct MatchHistoryTracker {
    pools: HashMap<Snowflake, Vec<Occurrence>>,
}

impl MatchHistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a pool's stored matches; each match counts as one
    /// co-occurrence at its creation time
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a MatchResult>) -> Self {
        let mut tracker = Self::new();
        for result in results {
            tracker
                .pools
                .entry(result.pool_id)
                .or_default()
                .push(Occurrence {
                    at: result.created_at,
                    members: result.members.clone(),
                });
        }
        tracker
    }

    /// Record every group of a freshly generated round
    pub fn record_round(
        &mut self,
        pool_id: Snowflake,
        groups: &[Vec<Snowflake>],
        round_time: DateTime<Utc>,
    ) {
        let entries = self.pools.entry(pool_id).or_default();
        entries.extend(groups.iter().filter(|g| g.len() >= 2).map(|g| Occurrence {
            at: round_time,
            members: g.clone(),
        }));
    }

    /// Rounds within `(as_of - window_days, as_of]` in which `a` and `b` shared a group
    pub fn count_for(
        &self,
        pool_id: Snowflake,
        a: Snowflake,
        b: Snowflake,
        window_days: u32,
        as_of: DateTime<Utc>,
    ) -> u32 {
        if a == b {
            return 0;
        }
        let cutoff = as_of - Duration::days(i64::from(window_days));
        self.pools.get(&pool_id).map_or(0, |entries| {
            entries
                .iter()
                .filter(|o| o.at > cutoff && o.at <= as_of && o.contains_pair(a, b))
                .count() as u32
        })
    }

    /// All pair counts for a pool within the trailing window
    pub fn pair_counts(&self, pool_id: Snowflake, window_days: u32, as_of: DateTime<Utc>) -> PairCounts {
        let cutoff = as_of - Duration::days(i64::from(window_days));
        let mut counts = PairCounts::new();

        for occurrence in self
            .pools
            .get(&pool_id)
            .into_iter()
            .flatten()
            .filter(|o| o.at > cutoff && o.at <= as_of)
        {
            for (i, &a) in occurrence.members.iter().enumerate() {
                for &b in &occurrence.members[i + 1..] {
                    counts.increment(a, b);
                }
            }
        }
        counts
    }

    /// Drop entries at or before `older_than`; returns how many were removed
    pub fn prune(&mut self, pool_id: Snowflake, older_than: DateTime<Utc>) -> usize {
        let Some(entries) = self.pools.get_mut(&pool_id) else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|o| o.at > older_than);
        let removed = before - entries.len();
        if entries.is_empty() {
            self.pools.remove(&pool_id);
        }
        removed
    }
}
