//! Round generation
//!
//! Greedy weighted clustering followed by a pairwise swap pass. The engine is
//! pure: identical inputs always yield an identical `RoundPlan`.

use serde::{Deserialize, Serialize};

use crate::entities::{Pool, PoolMember};
use crate::error::DomainError;
use crate::limits::{is_valid_match_size, NEUTRAL_COMPATIBILITY};
use crate::value_objects::{MatchingConfig, Snowflake};

use super::lookup::{CompatibilityLookup, HistoryLookup};

/// Minimum gain for a swap to be applied
const SWAP_EPSILON: f64 = 1e-9;

/// Groups and skipped members produced for one round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundPlan {
    /// Each group sorted by member ID; groups ordered by their first member
    pub groups: Vec<Vec<Snowflake>>,
    /// Members left out of this round, sorted
    pub skipped: Vec<Snowflake>,
}

impl RoundPlan {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn assigned_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

/// Dense symmetric pair-score table indexed by member position
struct ScoreTable {
    n: usize,
    scores: Vec<f64>,
}

impl ScoreTable {
    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[i * self.n + j]
    }

    #[inline]
    fn allowed(&self, i: usize, j: usize) -> bool {
        self.get(i, j) != f64::NEG_INFINITY
    }

    /// Sum of `k`'s scores against `group`, ignoring `except`; `None` on any exclusion
    fn aggregate(&self, k: usize, group: &[usize], except: Option<usize>) -> Option<f64> {
        let mut total = 0.0;
        for &m in group {
            if Some(m) == except || m == k {
                continue;
            }
            if !self.allowed(k, m) {
                return None;
            }
            total += self.get(k, m);
        }
        Some(total)
    }
}

/// Partitions a pool's active members into groups
#[derive(Debug, Clone, Copy, Default)]
pub struct PairingEngine {
    config: MatchingConfig,
}

impl PairingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Generate one round for `pool`
    ///
    /// Inactive and duplicate members are ignored. Fails with
    /// `NotEnoughMembers` when fewer than `match_size` remain; otherwise always
    /// returns a valid partition, skipping members that cannot be placed.
    pub fn generate_round<C, H>(
        &self,
        pool: &Pool,
        members: &[PoolMember],
        compatibility: &C,
        history: &H,
    ) -> Result<RoundPlan, DomainError>
    where
        C: CompatibilityLookup + ?Sized,
        H: HistoryLookup + ?Sized,
    {
        if !is_valid_match_size(pool.match_size) {
            return Err(DomainError::InvalidMatchSize(pool.match_size));
        }
        let size = usize::from(pool.match_size);

        // Positions follow the decimal form of the member ID, so ties between
        // equal scores resolve by lexical (a, b) comparison
        let mut active: Vec<&PoolMember> = members.iter().filter(|m| m.active).collect();
        active.sort_by_cached_key(|m| m.member_id.to_string());
        active.dedup_by_key(|m| m.member_id);

        if active.len() < size {
            return Err(DomainError::NotEnoughMembers {
                required: size,
                available: active.len(),
            });
        }

        let table = self.score_table(&active, compatibility, history);
        let mut groups = seed_groups(&table, size);
        let skipped = place_leftovers(&table, &mut groups, size);
        improve_by_swaps(&table, &mut groups);

        let mut groups: Vec<Vec<Snowflake>> = groups
            .into_iter()
            .map(|g| {
                let mut ids: Vec<Snowflake> = g.into_iter().map(|i| active[i].member_id).collect();
                ids.sort_unstable();
                ids
            })
            .collect();
        groups.sort();

        let mut skipped: Vec<Snowflake> = skipped.into_iter().map(|i| active[i].member_id).collect();
        skipped.sort_unstable();

        Ok(RoundPlan { groups, skipped })
    }

    /// Weighted score of a non-excluded pair
    pub fn pair_score(&self, compatibility: f64, history_count: u32) -> f64 {
        let compatibility = if compatibility.is_finite() {
            compatibility.clamp(0.0, 100.0)
        } else {
            NEUTRAL_COMPATIBILITY
        };
        let recency = f64::from(self.config.recency_days.max(1));
        let repetition = (f64::from(history_count) / recency).min(1.0);

        self.config.compatibility_weight * (compatibility / 100.0)
            - self.config.variety_weight * repetition
    }

    fn score_table<C, H>(&self, active: &[&PoolMember], compatibility: &C, history: &H) -> ScoreTable
    where
        C: CompatibilityLookup + ?Sized,
        H: HistoryLookup + ?Sized,
    {
        let n = active.len();
        let mut scores = vec![0.0; n * n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (active[i], active[j]);
                let score = if a.conflicts_with(b) {
                    f64::NEG_INFINITY
                } else {
                    self.pair_score(
                        compatibility.compatibility(a, b),
                        history.pair_count(a.member_id, b.member_id),
                    )
                };
                scores[i * n + j] = score;
                scores[j * n + i] = score;
            }
        }

        ScoreTable { n, scores }
    }
}

/// Consume eligible pairs best-first, growing each seeded pair to `size`
fn seed_groups(table: &ScoreTable, size: usize) -> Vec<Vec<usize>> {
    let n = table.n;
    let mut candidates: Vec<(f64, usize, usize)> = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            if table.allowed(i, j) {
                candidates.push((table.get(i, j), i, j));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then((a.1, a.2).cmp(&(b.1, b.2))));

    let mut assigned = vec![false; n];
    let mut groups = Vec::new();

    for (_, i, j) in candidates {
        if assigned[i] || assigned[j] {
            continue;
        }
        let mut group = vec![i, j];
        assigned[i] = true;
        assigned[j] = true;

        while group.len() < size {
            let Some(next) = best_addition(table, &group, &assigned) else {
                break;
            };
            assigned[next] = true;
            group.push(next);
        }
        groups.push(group);
    }

    groups
}

/// Unassigned member with the highest aggregate score against `group`
fn best_addition(table: &ScoreTable, group: &[usize], assigned: &[bool]) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    for k in (0..table.n).filter(|&k| !assigned[k]) {
        let Some(total) = table.aggregate(k, group, None) else {
            continue;
        };
        if best.map_or(true, |(score, _)| total > score) {
            best = Some((total, k));
        }
    }
    best.map(|(_, k)| k)
}

/// Attach each unplaced member to a group with room, or skip it
fn place_leftovers(table: &ScoreTable, groups: &mut [Vec<usize>], size: usize) -> Vec<usize> {
    let mut placed = vec![false; table.n];
    for &m in groups.iter().flatten() {
        placed[m] = true;
    }

    let mut skipped = Vec::new();
    for k in (0..table.n).filter(|&k| !placed[k]) {
        let mut best: Option<(f64, usize)> = None;
        for (gi, group) in groups.iter().enumerate() {
            if group.len() >= size {
                continue;
            }
            let Some(total) = table.aggregate(k, group, None) else {
                continue;
            };
            if best.map_or(true, |(score, _)| total > score) {
                best = Some((total, gi));
            }
        }

        match best {
            Some((_, gi)) => groups[gi].push(k),
            None => skipped.push(k),
        }
    }

    skipped
}

/// Repeatedly apply the single best member swap between two groups
fn improve_by_swaps(table: &ScoreTable, groups: &mut [Vec<usize>]) {
    let max_iterations = table.n * table.n;

    for _ in 0..max_iterations {
        let mut best: Option<(f64, usize, usize, usize, usize)> = None;

        for g1 in 0..groups.len() {
            for g2 in (g1 + 1)..groups.len() {
                for (p1, &x) in groups[g1].iter().enumerate() {
                    for (p2, &y) in groups[g2].iter().enumerate() {
                        let Some(delta) = swap_gain(table, &groups[g1], &groups[g2], x, y) else {
                            continue;
                        };
                        if delta > SWAP_EPSILON && best.map_or(true, |b| delta > b.0) {
                            best = Some((delta, g1, p1, g2, p2));
                        }
                    }
                }
            }
        }

        let Some((_, g1, p1, g2, p2)) = best else {
            return;
        };
        let x = groups[g1][p1];
        groups[g1][p1] = groups[g2][p2];
        groups[g2][p2] = x;
    }
}

/// Objective change from exchanging `x` (in `a`) with `y` (in `b`)
fn swap_gain(table: &ScoreTable, a: &[usize], b: &[usize], x: usize, y: usize) -> Option<f64> {
    let y_in_a = table.aggregate(y, a, Some(x))?;
    let x_in_b = table.aggregate(x, b, Some(y))?;
    let x_in_a = table.aggregate(x, a, None)?;
    let y_in_b = table.aggregate(y, b, None)?;
    Some((y_in_a + x_in_b) - (x_in_a + y_in_b))
}
