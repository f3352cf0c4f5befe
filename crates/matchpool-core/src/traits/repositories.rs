//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{MatchResult, MatchStatus, Pool, PoolMember};
use crate::error::DomainError;
use crate::value_objects::{MatchRound, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Pool Repository
// ============================================================================

#[async_trait]
pub trait PoolRepository: Send + Sync {
    /// Find pool by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Pool>>;

    /// List all pools of a guild, oldest first
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Pool>>;

    /// Number of pools configured for a guild
    async fn count_by_guild(&self, guild_id: Snowflake) -> RepoResult<i64>;

    /// Active pools whose `next_match_on <= now`, ordered by ID
    async fn find_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<Pool>>;

    /// Create a new pool
    async fn create(&self, pool: &Pool) -> RepoResult<()>;

    /// Persist admin-editable fields (frequency, match size, active, next_match_on)
    async fn update(&self, pool: &Pool) -> RepoResult<()>;

    /// Advance the schedule only if `next_match_on` still equals `expected_next`
    ///
    /// Returns `false` when another writer already advanced it.
    async fn advance_schedule(
        &self,
        pool_id: Snowflake,
        expected_next: DateTime<Utc>,
        last_match_on: DateTime<Utc>,
        next_match_on: DateTime<Utc>,
    ) -> RepoResult<bool>;
}

// ============================================================================
// Pool Member Repository
// ============================================================================

#[async_trait]
pub trait PoolMemberRepository: Send + Sync {
    /// Find a membership by pool and member ID (active or not)
    async fn find(&self, pool_id: Snowflake, member_id: Snowflake) -> RepoResult<Option<PoolMember>>;

    /// List every membership of a pool, ordered by member ID
    async fn find_by_pool(&self, pool_id: Snowflake) -> RepoResult<Vec<PoolMember>>;

    /// Number of active members in a pool
    async fn count_active(&self, pool_id: Snowflake) -> RepoResult<i64>;

    /// Add a membership
    async fn create(&self, member: &PoolMember) -> RepoResult<()>;

    /// Persist `active` and `excluded_members`
    async fn update(&self, member: &PoolMember) -> RepoResult<()>;
}

// ============================================================================
// Match Result Repository
// ============================================================================

/// Everything written when a round is generated, applied as one unit
#[derive(Debug, Clone)]
pub struct RoundCommit {
    pub pool_id: Snowflake,
    pub round: MatchRound,
    pub matches: Vec<MatchResult>,
    /// Pool schedule value the round was generated against
    pub expected_next: DateTime<Utc>,
    pub last_match_on: DateTime<Utc>,
    pub next_match_on: DateTime<Utc>,
}

/// Effects of a committed round beyond the inserted matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundCommitted {
    /// Earlier pending/scheduled matches of the pool marked skipped
    pub expired: u64,
}

/// One generated round of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: MatchRound,
    pub ran_on: DateTime<Utc>,
    pub match_count: i64,
}

#[async_trait]
pub trait MatchResultRepository: Send + Sync {
    /// Find match by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<MatchResult>>;

    /// All matches of one round, ordered by ID
    async fn find_by_round(&self, pool_id: Snowflake, round: &MatchRound) -> RepoResult<Vec<MatchResult>>;

    /// Whether any match exists for `(pool_id, round)`
    async fn round_exists(&self, pool_id: Snowflake, round: &MatchRound) -> RepoResult<bool>;

    /// Matches created at or after `since`, oldest first
    async fn find_since(&self, pool_id: Snowflake, since: DateTime<Utc>) -> RepoResult<Vec<MatchResult>>;

    /// Generated rounds of a pool, newest first
    async fn list_rounds(&self, pool_id: Snowflake) -> RepoResult<Vec<RoundSummary>>;

    /// Atomically insert a round's matches, expire the pool's earlier open
    /// matches, and advance the pool schedule
    ///
    /// Fails with `DomainError::RoundAlreadyGenerated` (and writes nothing)
    /// when `(pool_id, round)` already has matches.
    async fn commit_round(&self, commit: &RoundCommit) -> RepoResult<RoundCommitted>;

    /// Persist status and scheduling fields if the stored status still equals `expected`
    ///
    /// Returns `false` when a concurrent transition won.
    async fn update_status(&self, result: &MatchResult, expected: MatchStatus) -> RepoResult<bool>;
}
