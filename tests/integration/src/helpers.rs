//! Test helpers
//!
//! Wires the in-memory adapters into a `ServiceContext` and seeds pools and
//! members with readable numeric IDs.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use matchpool_core::traits::{PoolMemberRepository, PoolRepository};
use matchpool_core::{Frequency, MatchingConfig, Pool, PoolMember, Snowflake, SnowflakeGenerator};
use matchpool_service::{RoundScheduler, SchedulerOptions, ServiceContext, ServiceContextBuilder};

use crate::fixtures::{FakeCompatibility, InMemoryStore, RecordingNotifier};

/// Shorthand for a Snowflake
pub fn sf(id: i64) -> Snowflake {
    Snowflake::new(id)
}

pub fn sfs(ids: &[i64]) -> Vec<Snowflake> {
    ids.iter().copied().map(Snowflake::new).collect()
}

/// Midday UTC on the given date
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A service context over in-memory adapters, with handles to each fake
pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub compatibility: Arc<FakeCompatibility>,
    pub notifier: Arc<RecordingNotifier>,
    pub ctx: ServiceContext,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(MatchingConfig::default())
    }

    pub fn with_config(config: MatchingConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let compatibility = Arc::new(FakeCompatibility::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let ctx = ServiceContextBuilder::new()
            .pool_repo(store.clone())
            .member_repo(store.clone())
            .match_repo(store.clone())
            .membership(store.clone())
            .compatibility(compatibility.clone())
            .notifier(notifier.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .matching_config(config)
            .build()
            .unwrap_or_else(|e| panic!("test context: {e}"));

        Self {
            store,
            compatibility,
            notifier,
            ctx,
        }
    }

    pub fn scheduler(&self) -> RoundScheduler {
        RoundScheduler::new(self.ctx.clone(), SchedulerOptions::default())
    }

    pub fn scheduler_with(&self, options: SchedulerOptions) -> RoundScheduler {
        RoundScheduler::new(self.ctx.clone(), options)
    }

    /// Store an active weekly pool directly, skipping admin validation
    pub async fn seed_pool(&self, id: i64, match_size: u8, next_match_on: DateTime<Utc>) -> Pool {
        let pool = Pool::new(sf(id), sf(900), Frequency::Weekly, match_size, next_match_on);
        PoolRepository::create(self.store.as_ref(), &pool)
            .await
            .unwrap_or_else(|e| panic!("seed pool: {e}"));
        pool
    }

    /// Store active members whose user ID is `member_id + 1000`
    pub async fn seed_members(&self, pool_id: i64, member_ids: &[i64]) {
        for &id in member_ids {
            self.seed_member(pool_id, id, &[]).await;
        }
    }

    pub async fn seed_member(&self, pool_id: i64, member_id: i64, exclusions: &[i64]) -> PoolMember {
        let member = PoolMember::new(sf(pool_id * 10_000 + member_id), sf(pool_id), sf(member_id), sf(member_id + 1000))
            .with_exclusions(sfs(exclusions));
        PoolMemberRepository::create(self.store.as_ref(), &member)
            .await
            .unwrap_or_else(|e| panic!("seed member: {e}"));
        member
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
