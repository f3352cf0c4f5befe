//! External collaborator ports
//!
//! Compatibility scoring, guild membership, and notification delivery are
//! owned by other systems; the engine only consumes them through these traits.

use async_trait::async_trait;

use crate::entities::{MatchResult, MatchStatus, Pool, PoolMember};
use crate::value_objects::Snowflake;

use super::repositories::RepoResult;

/// Opaque 0-100 compatibility score between two users
#[async_trait]
pub trait CompatibilityProvider: Send + Sync {
    /// Score for an unordered pair of users
    async fn score(&self, user_a: Snowflake, user_b: Snowflake) -> RepoResult<f64>;

    /// Scores for every unordered pair among `users`
    ///
    /// Pairs whose lookup fails are left out; callers treat missing pairs as
    /// neutral. Implementations backed by a store should override this with a
    /// single batched query.
    async fn score_all(&self, users: &[Snowflake]) -> RepoResult<Vec<(Snowflake, Snowflake, f64)>> {
        let mut scores = Vec::with_capacity(users.len() * users.len().saturating_sub(1) / 2);
        for (i, &a) in users.iter().enumerate() {
            for &b in &users[i + 1..] {
                if let Ok(score) = self.score(a, b).await {
                    scores.push((a, b, score));
                }
            }
        }
        Ok(scores)
    }
}

/// Source of a pool's currently active members
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Active members of the pool, ordered by member ID
    async fn active_members(&self, pool_id: Snowflake) -> RepoResult<Vec<PoolMember>>;
}

/// Fire-and-forget delivery of match notifications
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Called once per persisted match of a new round
    async fn notify_match_created(&self, pool: &Pool, result: &MatchResult) -> RepoResult<()>;

    /// Called after a lifecycle transition is persisted
    async fn notify_status_changed(
        &self,
        _result: &MatchResult,
        _previous: MatchStatus,
    ) -> RepoResult<()> {
        Ok(())
    }
}
