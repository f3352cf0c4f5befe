//! Round scheduler tests
//!
//! Run with: cargo test -p integration-tests --test scheduler_tests

use std::collections::BTreeSet;
use std::time::Duration as StdDuration;

use chrono::Duration;
use integration_tests::{at, sf, sfs, TestHarness};
use matchpool_core::matching::pair_key;
use matchpool_core::{MatchRound, MatchStatus, Snowflake};
use matchpool_service::dto::UpdatePoolRequest;
use matchpool_service::{MatchLifecycleManager, PoolLocks, PoolService, RoundStatus, SchedulerOptions};

fn round(key: &str) -> MatchRound {
    MatchRound::parse(key).unwrap()
}

fn pairs(groups: &[Vec<Snowflake>]) -> BTreeSet<(Snowflake, Snowflake)> {
    let mut found = BTreeSet::new();
    for group in groups {
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                found.insert(pair_key(a, b));
            }
        }
    }
    found
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_generates_round_for_due_pool() {
    let h = TestHarness::new();
    let now = at(2024, 12, 30);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].pool_id, pool.id);
    // 2024-12-30 belongs to the first ISO week of 2025
    assert_eq!(outcomes[0].round, Some(round("2025-W01")));
    assert_eq!(
        outcomes[0].status,
        RoundStatus::Generated {
            match_count: 2,
            skipped_members: 0,
            expired: 0,
        }
    );
    assert_eq!(
        h.store.groups_for(pool.id, &round("2025-W01")),
        vec![sfs(&[1, 2]), sfs(&[3, 4])]
    );

    let stored = h.store.pool(pool.id).unwrap();
    assert_eq!(stored.last_match_on, Some(now));
    assert_eq!(stored.next_match_on, now + Duration::days(7));

    let created = h.notifier.created();
    assert_eq!(created.len(), 2);
    let ids: Vec<Snowflake> = h.store.matches_for(pool.id).iter().map(|m| m.id).collect();
    assert_eq!(created.iter().copied().collect::<BTreeSet<_>>(), ids.into_iter().collect());
}

#[tokio::test]
async fn test_compatibility_drives_grouping() {
    let h = TestHarness::new();
    let now = at(2025, 3, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    // user IDs are member IDs + 1000
    h.compatibility.set(sf(1001), sf(1003), 95.0);
    h.compatibility.set(sf(1002), sf(1004), 90.0);

    h.scheduler().run_due_rounds(now).await.unwrap();

    assert_eq!(
        h.store.groups_for(pool.id, &MatchRound::from_date(now)),
        vec![sfs(&[1, 3]), sfs(&[2, 4])]
    );
}

#[tokio::test]
async fn test_exclusion_respected_with_leftover_skipped() {
    let h = TestHarness::new();
    let now = at(2025, 3, 3);
    let pool = h.seed_pool(1, 3, now).await;
    h.seed_member(1, 1, &[4]).await;
    h.seed_members(1, &[2, 3, 4]).await;

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert_eq!(
        outcomes[0].status,
        RoundStatus::Generated {
            match_count: 1,
            skipped_members: 1,
            expired: 0,
        }
    );
    let groups = h.store.groups_for(pool.id, &MatchRound::from_date(now));
    assert_eq!(groups, vec![sfs(&[1, 2, 3])]);
    assert!(!pairs(&groups).contains(&pair_key(sf(1), sf(4))));
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_second_tick_is_a_noop() {
    let h = TestHarness::new();
    let now = at(2024, 12, 30);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    let scheduler = h.scheduler();

    scheduler.run_due_rounds(now).await.unwrap();
    let before = h.store.matches_for(pool.id);

    let outcomes = scheduler.run_due_rounds(now).await.unwrap();

    assert!(outcomes.is_empty());
    assert_eq!(h.store.matches_for(pool.id), before);
    assert_eq!(h.notifier.created().len(), 2);
}

#[tokio::test]
async fn test_rescheduled_into_generated_week_only_advances() {
    let h = TestHarness::new();
    let first = at(2024, 12, 30);
    let pool = h.seed_pool(1, 2, first).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    let scheduler = h.scheduler();
    scheduler.run_due_rounds(first).await.unwrap();

    // admin pulls the next round back into the week that already ran
    PoolService::new(&h.ctx)
        .update_pool(
            pool.id,
            UpdatePoolRequest {
                next_match_on: Some(at(2024, 12, 31)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let now = at(2025, 1, 1);
    let outcomes = scheduler.run_due_rounds(now).await.unwrap();

    assert_eq!(outcomes[0].status, RoundStatus::AlreadyGenerated);
    assert_eq!(outcomes[0].round, Some(round("2025-W01")));
    assert_eq!(h.store.matches_for(pool.id).len(), 2);

    let stored = h.store.pool(pool.id).unwrap();
    assert_eq!(stored.last_match_on, Some(now));
    assert_eq!(stored.next_match_on, now + Duration::days(7));
}

#[tokio::test]
async fn test_concurrent_processes_generate_once() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    // both ticks load their inputs before either commits
    h.store.set_member_delay(StdDuration::from_millis(20));

    // separate lock registries, as two scheduler processes would have
    let a = h.scheduler();
    let b = h.scheduler();
    let (first, second) = tokio::join!(a.run_due_rounds(now), b.run_due_rounds(now));

    let outcomes: Vec<_> = first.unwrap().into_iter().chain(second.unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_generated()).count(), 1);
    assert!(outcomes
        .iter()
        .filter(|o| !o.is_generated())
        .all(|o| matches!(o.status, RoundStatus::AlreadyGenerated | RoundStatus::NotDue)));
    assert_eq!(h.store.round_count(pool.id), 1);
    assert_eq!(h.store.matches_for(pool.id).len(), 2);
}

#[tokio::test]
async fn test_overlapping_ticks_serialize_per_pool() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    h.store.set_member_delay(StdDuration::from_millis(20));

    let scheduler = h.scheduler();
    let (first, second) = tokio::join!(scheduler.run_due_rounds(now), scheduler.run_due_rounds(now));

    let outcomes: Vec<_> = first.unwrap().into_iter().chain(second.unwrap()).collect();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes.iter().filter(|o| o.is_generated()).count(), 1);
    // the waiter reloads the pool under the lock and finds it advanced
    assert!(outcomes.iter().any(|o| o.status == RoundStatus::NotDue));
    assert_eq!(h.store.matches_for(pool.id).len(), 2);
}

// ============================================================================
// Capacity and failures
// ============================================================================

#[tokio::test]
async fn test_capacity_skip_writes_nothing_and_advances() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1]).await;

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert_eq!(
        outcomes[0].status,
        RoundStatus::SkippedForCapacity {
            required: 2,
            available: 1,
        }
    );
    assert!(h.store.matches_for(pool.id).is_empty());
    assert_eq!(h.store.round_count(pool.id), 0);
    assert_eq!(h.store.pool(pool.id).unwrap().next_match_on, now + Duration::days(7));
}

#[tokio::test]
async fn test_inactive_members_do_not_count() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let pool = h.seed_pool(1, 3, now).await;
    h.seed_members(1, &[1, 2]).await;
    let mut leaver = h.seed_member(1, 3, &[]).await;
    leaver.set_active(false);
    matchpool_core::traits::PoolMemberRepository::update(h.store.as_ref(), &leaver)
        .await
        .unwrap();

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert_eq!(
        outcomes[0].status,
        RoundStatus::SkippedForCapacity {
            required: 3,
            available: 2,
        }
    );
    assert!(h.store.matches_for(pool.id).is_empty());
}

#[tokio::test]
async fn test_notification_failure_keeps_round() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    h.notifier.set_failing(true);

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert!(outcomes[0].is_generated());
    assert_eq!(h.store.matches_for(pool.id).len(), 2);
    assert!(h.notifier.created().is_empty());
}

#[tokio::test]
async fn test_compatibility_outage_falls_back_to_neutral() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    h.compatibility.set(sf(1001), sf(1004), 99.0);
    h.compatibility.set_failing(true);

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert!(outcomes[0].is_generated());
    assert_eq!(
        h.store.groups_for(pool.id, &MatchRound::from_date(now)),
        vec![sfs(&[1, 2]), sfs(&[3, 4])]
    );
}

#[tokio::test]
async fn test_failing_pool_does_not_stop_others() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    // a stored size outside [2, 6] makes the engine refuse the pool
    let broken = h.seed_pool(1, 1, now).await;
    h.seed_members(1, &[1, 2]).await;
    let healthy = h.seed_pool(2, 2, now).await;
    h.seed_members(2, &[1, 2]).await;

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].pool_id, broken.id);
    assert!(matches!(
        outcomes[0].status,
        RoundStatus::Failed {
            code: "INVALID_MATCH_SIZE",
            ..
        }
    ));
    assert_eq!(outcomes[1].pool_id, healthy.id);
    assert!(outcomes[1].is_generated());

    // the failed pool stays due for the next tick
    assert_eq!(h.store.pool(broken.id).unwrap().next_match_on, now);
}

#[tokio::test]
async fn test_deadline_defers_unfinished_pools() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    h.store.set_member_delay(StdDuration::from_millis(300));

    let scheduler = h.scheduler_with(SchedulerOptions {
        workers: 1,
        tick_deadline: StdDuration::from_millis(30),
    });
    let outcomes = scheduler.run_due_rounds(now).await.unwrap();

    assert_eq!(outcomes[0].status, RoundStatus::Deferred);
    assert!(h.store.matches_for(pool.id).is_empty());
    assert!(h.store.pool(pool.id).unwrap().is_due(now));
}

#[tokio::test]
async fn test_pool_locks_released_after_tick() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    for id in [1, 2, 3] {
        h.seed_pool(id, 2, now).await;
        h.seed_members(id, &[1, 2]).await;
    }
    // a size-1 pool fails in the engine
    h.seed_pool(4, 1, now).await;
    h.seed_members(4, &[1, 2]).await;
    let locks = PoolLocks::new();
    let scheduler = h.scheduler().with_locks(locks.clone());

    let outcomes = scheduler.run_due_rounds(now).await.unwrap();
    assert_eq!(outcomes.len(), 4);
    assert!(locks.is_empty());

    scheduler.trigger_round_now(sf(1), now).await.unwrap();
    assert!(locks.is_empty());

    h.seed_pool(5, 2, now).await;
    h.seed_members(5, &[1, 2]).await;
    h.store.set_member_delay(StdDuration::from_millis(300));
    let slow = h
        .scheduler_with(SchedulerOptions {
            workers: 1,
            tick_deadline: StdDuration::from_millis(30),
        })
        .with_locks(locks.clone());
    let outcomes = slow.run_due_rounds(now).await.unwrap();
    assert!(outcomes.iter().any(|o| o.status == RoundStatus::Deferred));
    assert!(locks.is_empty());
}

#[tokio::test]
async fn test_outcomes_sorted_by_pool_id() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    for id in [3, 1, 2] {
        h.seed_pool(id, 2, now).await;
        h.seed_members(id, &[1, 2]).await;
    }

    let scheduler = h.scheduler_with(SchedulerOptions {
        workers: 2,
        tick_deadline: StdDuration::from_secs(5),
    });
    let outcomes = scheduler.run_due_rounds(now).await.unwrap();

    let ids: Vec<Snowflake> = outcomes.iter().map(|o| o.pool_id).collect();
    assert_eq!(ids, sfs(&[1, 2, 3]));
    assert!(outcomes.iter().all(|o| o.is_generated()));
}

#[tokio::test]
async fn test_inactive_pools_are_not_run() {
    let h = TestHarness::new();
    let now = at(2025, 2, 3);
    let mut pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2]).await;
    pool.set_active(false);
    h.store.put_pool(pool.clone());

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert!(outcomes.is_empty());
    assert!(h.store.matches_for(pool.id).is_empty());
}

// ============================================================================
// Rotation across rounds
// ============================================================================

#[tokio::test]
async fn test_next_round_expires_open_matches_and_rotates_pairs() {
    let h = TestHarness::new();
    let first = at(2024, 12, 30);
    let pool = h.seed_pool(1, 2, first).await;
    h.seed_members(1, &[1, 2, 3, 4, 5, 6]).await;
    let scheduler = h.scheduler();
    scheduler.run_due_rounds(first).await.unwrap();

    let round_one = h.store.groups_for(pool.id, &round("2025-W01"));
    assert_eq!(round_one, vec![sfs(&[1, 2]), sfs(&[3, 4]), sfs(&[5, 6])]);

    let matches = h.store.matches_for(pool.id);
    let match_with = |member: i64| {
        matches
            .iter()
            .find(|m| m.includes(sf(member)))
            .map(|m| m.id)
            .unwrap()
    };
    let (completed, scheduled, pending) = (match_with(1), match_with(3), match_with(5));

    let lifecycle = MatchLifecycleManager::new(&h.ctx);
    lifecycle.complete_match(completed, sf(1)).await.unwrap();
    lifecycle
        .schedule_match(
            scheduled,
            sf(3),
            matchpool_service::dto::ScheduleMatchRequest {
                scheduled_time: first + Duration::days(2),
                scheduled_event: None,
            },
        )
        .await
        .unwrap();

    let second = at(2025, 1, 6);
    let outcomes = scheduler.run_due_rounds(second).await.unwrap();

    assert_eq!(outcomes[0].round, Some(round("2025-W02")));
    assert_eq!(
        outcomes[0].status,
        RoundStatus::Generated {
            match_count: 3,
            skipped_members: 0,
            expired: 2,
        }
    );

    let status_of = |id: Snowflake| {
        h.store
            .matches_for(pool.id)
            .into_iter()
            .find(|m| m.id == id)
            .map(|m| m.status)
            .unwrap()
    };
    assert_eq!(status_of(completed), MatchStatus::Completed);
    assert_eq!(status_of(scheduled), MatchStatus::Skipped);
    assert_eq!(status_of(pending), MatchStatus::Skipped);

    // variety pressure: no pair from the previous week repeats
    let round_two = h.store.groups_for(pool.id, &round("2025-W02"));
    assert_eq!(round_two.len(), 3);
    assert!(pairs(&round_two).is_disjoint(&pairs(&round_one)));
}

#[tokio::test]
async fn test_history_outside_recency_window_is_ignored() {
    let h = TestHarness::new();
    let first = at(2025, 1, 6);
    let pool = h.seed_pool(1, 2, first).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    let scheduler = h.scheduler();
    scheduler.run_due_rounds(first).await.unwrap();

    let mut stored = h.store.pool(pool.id).unwrap();
    stored.reschedule(at(2025, 2, 17));
    h.store.put_pool(stored);

    // 42 days later, past the default 30 day window
    let later = at(2025, 2, 17);
    scheduler.run_due_rounds(later).await.unwrap();

    assert_eq!(
        h.store.groups_for(pool.id, &MatchRound::from_date(later)),
        h.store.groups_for(pool.id, &MatchRound::from_date(first))
    );
}

// ============================================================================
// Manual trigger
// ============================================================================

#[tokio::test]
async fn test_trigger_runs_pool_before_it_is_due() {
    let h = TestHarness::new();
    let pool = h.seed_pool(1, 2, at(2025, 1, 20)).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    let scheduler = h.scheduler();

    let now = at(2025, 1, 8);
    let outcome = scheduler.trigger_round_now(pool.id, now).await.unwrap();

    assert_eq!(outcome.round, Some(round("2025-W02")));
    assert!(outcome.is_generated());
    assert_eq!(h.store.pool(pool.id).unwrap().next_match_on, now + Duration::days(7));

    // same week again goes through the idempotent path
    let again = scheduler.trigger_round_now(pool.id, now + Duration::hours(1)).await.unwrap();
    assert_eq!(again.status, RoundStatus::AlreadyGenerated);
    assert_eq!(h.store.matches_for(pool.id).len(), 2);
    assert_eq!(h.store.pool(pool.id).unwrap().next_match_on, now + Duration::days(7));
}

#[tokio::test]
async fn test_trigger_rejects_unknown_and_inactive_pools() {
    let h = TestHarness::new();
    let scheduler = h.scheduler();

    let err = scheduler.trigger_round_now(sf(404), at(2025, 1, 8)).await.unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_POOL");

    let mut pool = h.seed_pool(1, 2, at(2025, 1, 8)).await;
    pool.set_active(false);
    h.store.put_pool(pool.clone());

    let err = scheduler.trigger_round_now(pool.id, at(2025, 1, 8)).await.unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");
}
