//! Round scheduler
//!
//! Runs a round for every due pool. Pools are processed concurrently, bounded
//! by `workers`; a per-pool lock serializes generation for one pool, and the
//! `(pool_id, match_round)` key turns any repeated run into a no-op.
//!
//! Waiting for the lock and loading inputs count against the tick deadline.
//! Once a plan exists the commit and notifications always run to completion.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use matchpool_common::SchedulerConfig;
use matchpool_core::traits::RoundCommit;
use matchpool_core::{
    CompatibilityMatrix, DomainError, MatchHistoryTracker, MatchResult, MatchRound, PairCounts,
    Pool, PoolMember, RoundPlan, Snowflake,
};
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{timeout_at, Instant};
use tracing::{error, field, info, instrument, warn, Span};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Tick-level knobs
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    /// Pools processed at the same time
    pub workers: usize,
    /// Budget for one `run_due_rounds` call
    pub tick_deadline: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from(&SchedulerConfig::default())
    }
}

impl From<&SchedulerConfig> for SchedulerOptions {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            workers: config.workers.max(1),
            tick_deadline: config.tick_deadline(),
        }
    }
}

/// One mutex per pool, created on first use and dropped once no run holds it
#[derive(Debug, Clone, Default)]
pub struct PoolLocks {
    locks: Arc<DashMap<Snowflake, Arc<Mutex<()>>>>,
}

impl PoolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, pool_id: Snowflake) -> Arc<Mutex<()>> {
        self.locks.entry(pool_id).or_default().clone()
    }

    /// Drop the pool's entry when the registry holds the only reference
    pub fn release(&self, pool_id: Snowflake) {
        self.locks.remove_if(&pool_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// What happened to one pool during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoundStatus {
    /// Matches persisted for a new round
    Generated {
        match_count: usize,
        skipped_members: usize,
        /// Open matches of earlier rounds closed as skipped
        expired: u64,
    },
    /// The round key already had matches; nothing was written
    AlreadyGenerated,
    /// Fewer active members than the match size
    SkippedForCapacity { required: usize, available: usize },
    /// Another worker advanced or deactivated the pool first
    NotDue,
    /// The tick deadline passed before the pool was started
    Deferred,
    /// Generation returned an error; the pool stays due
    Failed { code: &'static str, error: String },
}

impl RoundStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generated { .. } => "generated",
            Self::AlreadyGenerated => "already_generated",
            Self::SkippedForCapacity { .. } => "skipped_for_capacity",
            Self::NotDue => "not_due",
            Self::Deferred => "deferred",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    pub pool_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<MatchRound>,
    #[serde(flatten)]
    pub status: RoundStatus,
}

impl RoundOutcome {
    pub fn new(pool_id: Snowflake, round: Option<MatchRound>, status: RoundStatus) -> Self {
        Self {
            pool_id,
            round,
            status,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.status, RoundStatus::Generated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Regular tick; the pool must still be due once locked
    Scheduled,
    /// Admin override; runs an active pool regardless of its schedule
    Manual,
}

enum Step {
    Done(RoundOutcome),
    Commit {
        pool: Pool,
        round: MatchRound,
        plan: RoundPlan,
    },
}

/// Generates rounds for due pools
#[derive(Debug, Clone)]
pub struct RoundScheduler {
    ctx: ServiceContext,
    locks: PoolLocks,
    options: SchedulerOptions,
}

impl RoundScheduler {
    pub fn new(ctx: ServiceContext, options: SchedulerOptions) -> Self {
        Self {
            ctx,
            locks: PoolLocks::new(),
            options,
        }
    }

    /// Share a lock registry with other schedulers in this process
    pub fn with_locks(mut self, locks: PoolLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn options(&self) -> SchedulerOptions {
        self.options
    }

    /// Run one tick: every active pool with `next_match_on <= now`
    ///
    /// A failing pool is reported in its outcome and never stops the others.
    /// Outcomes are ordered by pool ID.
    #[instrument(skip(self), fields(now = %now))]
    pub async fn run_due_rounds(&self, now: DateTime<Utc>) -> ServiceResult<Vec<RoundOutcome>> {
        let due = self.ctx.pool_repo().find_due(now).await?;
        if due.is_empty() {
            return Ok(Vec::new());
        }

        let deadline = Instant::now() + self.options.tick_deadline;
        let mut outcomes: Vec<RoundOutcome> = stream::iter(due)
            .map(|pool| async move {
                match self.run_pool(pool.id, now, Trigger::Scheduled, Some(deadline)).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        let code = e.error_code();
                        error!(pool_id = %pool.id, code, error = %e, "Round generation failed");
                        RoundOutcome::new(
                            pool.id,
                            None,
                            RoundStatus::Failed {
                                code,
                                error: e.to_string(),
                            },
                        )
                    }
                }
            })
            .buffer_unordered(self.options.workers.max(1))
            .collect()
            .await;

        outcomes.sort_by_key(|o| o.pool_id);
        log_summary(&outcomes);
        Ok(outcomes)
    }

    /// Run a round for one pool now, through the same idempotent path as a tick
    #[instrument(skip(self), fields(pool_id = %pool_id))]
    pub async fn trigger_round_now(
        &self,
        pool_id: Snowflake,
        now: DateTime<Utc>,
    ) -> ServiceResult<RoundOutcome> {
        let pool = self
            .ctx
            .pool_repo()
            .find_by_id(pool_id)
            .await?
            .ok_or(DomainError::PoolNotFound(pool_id))?;
        if !pool.active {
            return Err(ServiceError::conflict(format!("Pool {pool_id} is inactive")));
        }

        self.run_pool(pool_id, now, Trigger::Manual, None).await
    }

    #[instrument(skip(self, deadline), fields(pool_id = %pool_id, round = field::Empty))]
    async fn run_pool(
        &self,
        pool_id: Snowflake,
        now: DateTime<Utc>,
        trigger: Trigger,
        deadline: Option<Instant>,
    ) -> ServiceResult<RoundOutcome> {
        let result = self.run_pool_locked(pool_id, now, trigger, deadline).await;
        self.locks.release(pool_id);
        result
    }

    async fn run_pool_locked(
        &self,
        pool_id: Snowflake,
        now: DateTime<Utc>,
        trigger: Trigger,
        deadline: Option<Instant>,
    ) -> ServiceResult<RoundOutcome> {
        let lock = self.locks.lock_for(pool_id);
        let prepared = match deadline {
            Some(deadline) => {
                if Instant::now() >= deadline {
                    return Ok(deferred(pool_id));
                }
                match timeout_at(deadline, self.lock_and_prepare(lock, pool_id, now, trigger)).await {
                    Ok(prepared) => prepared?,
                    Err(_) => return Ok(deferred(pool_id)),
                }
            }
            None => self.lock_and_prepare(lock, pool_id, now, trigger).await?,
        };

        let (_guard, step) = prepared;
        match step {
            Step::Done(outcome) => Ok(outcome),
            Step::Commit { pool, round, plan } => self.commit(&pool, round, &plan, now).await,
        }
    }

    async fn lock_and_prepare(
        &self,
        lock: Arc<Mutex<()>>,
        pool_id: Snowflake,
        now: DateTime<Utc>,
        trigger: Trigger,
    ) -> ServiceResult<(OwnedMutexGuard<()>, Step)> {
        let guard = lock.lock_owned().await;
        let step = self.prepare(pool_id, now, trigger).await?;
        Ok((guard, step))
    }

    /// Everything up to the write: reload, idempotency check, inputs, plan
    async fn prepare(&self, pool_id: Snowflake, now: DateTime<Utc>, trigger: Trigger) -> ServiceResult<Step> {
        // Reload under the lock; the tick's snapshot may be stale
        let pool = self
            .ctx
            .pool_repo()
            .find_by_id(pool_id)
            .await?
            .ok_or(DomainError::PoolNotFound(pool_id))?;
        if trigger == Trigger::Scheduled && !pool.is_due(now) {
            return Ok(Step::Done(RoundOutcome::new(pool_id, None, RoundStatus::NotDue)));
        }

        let round = MatchRound::from_date(pool.next_match_on.min(now));
        Span::current().record("round", round.as_str());

        if self.ctx.match_repo().round_exists(pool.id, &round).await? {
            self.advance_if_due(&pool, now).await?;
            info!("Round already generated");
            return Ok(Step::Done(RoundOutcome::new(
                pool.id,
                Some(round),
                RoundStatus::AlreadyGenerated,
            )));
        }

        let members = self.ctx.membership().active_members(pool.id).await?;
        let available = members.iter().filter(|m| m.active).count();
        let required = usize::from(pool.match_size);
        if available < required {
            return self.skip_for_capacity(&pool, round, required, available, now).await;
        }

        let compatibility = self.prefetch_compatibility(&members).await;
        let history = self.recent_history(&pool, now).await?;

        match self
            .ctx
            .engine()
            .generate_round(&pool, &members, &compatibility, &history)
        {
            Ok(plan) => Ok(Step::Commit { pool, round, plan }),
            Err(DomainError::NotEnoughMembers {
                required,
                available,
            }) => self.skip_for_capacity(&pool, round, required, available, now).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn commit(
        &self,
        pool: &Pool,
        round: MatchRound,
        plan: &RoundPlan,
        now: DateTime<Utc>,
    ) -> ServiceResult<RoundOutcome> {
        let matches: Vec<MatchResult> = plan
            .groups
            .iter()
            .map(|group| MatchResult::new(self.ctx.generate_id(), pool.id, round.clone(), group.clone(), now))
            .collect();
        let commit = RoundCommit {
            pool_id: pool.id,
            round: round.clone(),
            matches,
            expected_next: pool.next_match_on,
            last_match_on: now,
            next_match_on: pool.frequency.next_match_date(now),
        };

        let committed = match self.ctx.match_repo().commit_round(&commit).await {
            Ok(committed) => committed,
            Err(DomainError::RoundAlreadyGenerated { .. }) => {
                info!("Round committed by another worker");
                return Ok(RoundOutcome::new(pool.id, Some(round), RoundStatus::AlreadyGenerated));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            matches = commit.matches.len(),
            skipped = plan.skipped.len(),
            expired = committed.expired,
            next_match_on = %commit.next_match_on,
            "Round generated"
        );

        for result in &commit.matches {
            if let Err(e) = self.ctx.notifier().notify_match_created(pool, result).await {
                warn!(match_id = %result.id, error = %e, "Match notification failed");
            }
        }

        Ok(RoundOutcome::new(
            pool.id,
            Some(round),
            RoundStatus::Generated {
                match_count: commit.matches.len(),
                skipped_members: plan.skipped.len(),
                expired: committed.expired,
            },
        ))
    }

    async fn skip_for_capacity(
        &self,
        pool: &Pool,
        round: MatchRound,
        required: usize,
        available: usize,
        now: DateTime<Utc>,
    ) -> ServiceResult<Step> {
        warn!(required, available, "Not enough active members, skipping round");
        self.advance_if_due(pool, now).await?;
        Ok(Step::Done(RoundOutcome::new(
            pool.id,
            Some(round),
            RoundStatus::SkippedForCapacity {
                required,
                available,
            },
        )))
    }

    /// Move a due pool to its next cadence without writing a round
    async fn advance_if_due(&self, pool: &Pool, now: DateTime<Utc>) -> ServiceResult<()> {
        if pool.next_match_on > now {
            return Ok(());
        }
        let advanced = self
            .ctx
            .pool_repo()
            .advance_schedule(
                pool.id,
                pool.next_match_on,
                now,
                pool.frequency.next_match_date(now),
            )
            .await?;
        if !advanced {
            info!("Schedule already advanced");
        }
        Ok(())
    }

    /// All pair scores for the round's users; neutral on failure
    async fn prefetch_compatibility(&self, members: &[PoolMember]) -> CompatibilityMatrix {
        let users: Vec<Snowflake> = members
            .iter()
            .filter(|m| m.active)
            .map(|m| m.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        match self.ctx.compatibility().score_all(&users).await {
            Ok(scores) => scores.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "Compatibility lookup failed, using neutral scores");
                CompatibilityMatrix::new()
            }
        }
    }

    async fn recent_history(&self, pool: &Pool, now: DateTime<Utc>) -> ServiceResult<PairCounts> {
        let window = self.ctx.matching_config().recency_days;
        let since = now - ChronoDuration::days(i64::from(window));
        let results = self.ctx.match_repo().find_since(pool.id, since).await?;
        Ok(MatchHistoryTracker::from_results(&results).pair_counts(pool.id, window, now))
    }
}

fn deferred(pool_id: Snowflake) -> RoundOutcome {
    warn!(pool_id = %pool_id, "Tick deadline reached, deferring pool");
    RoundOutcome::new(pool_id, None, RoundStatus::Deferred)
}

fn log_summary(outcomes: &[RoundOutcome]) {
    let count = |label: &str| outcomes.iter().filter(|o| o.status.label() == label).count();
    info!(
        pools = outcomes.len(),
        generated = count("generated"),
        already_generated = count("already_generated"),
        skipped_for_capacity = count("skipped_for_capacity"),
        deferred = count("deferred"),
        failed = count("failed"),
        "Tick finished"
    );
}
