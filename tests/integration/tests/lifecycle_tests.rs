//! Match lifecycle tests
//!
//! Run with: cargo test -p integration-tests --test lifecycle_tests

use chrono::Duration;
use integration_tests::{at, sf, TestHarness};
use matchpool_core::{DomainError, MatchResult, MatchStatus, Snowflake};
use matchpool_service::dto::ScheduleMatchRequest;
use matchpool_service::MatchLifecycleManager;

/// Generate one round of pairs for members 1..=4 and return the match holding member 1
async fn generated_match(h: &TestHarness) -> MatchResult {
    let now = at(2025, 3, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    h.scheduler().run_due_rounds(now).await.unwrap();

    h.store
        .matches_for(pool.id)
        .into_iter()
        .find(|m| m.includes(sf(1)))
        .unwrap()
}

fn schedule_request(days: i64, event: Option<&str>) -> ScheduleMatchRequest {
    ScheduleMatchRequest {
        scheduled_time: at(2025, 3, 3) + Duration::days(days),
        scheduled_event: event.map(str::to_string),
    }
}

#[tokio::test]
async fn test_schedule_reschedule_complete() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    let partner = m.members.iter().copied().find(|&id| id != sf(1)).unwrap();
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    let scheduled = lifecycle
        .schedule_match(m.id, sf(1), schedule_request(2, Some("Coffee")))
        .await
        .unwrap();
    assert_eq!(scheduled.status, "scheduled");
    assert_eq!(scheduled.scheduled_event.as_deref(), Some("Coffee"));
    assert_eq!(scheduled.scheduled_time, Some(at(2025, 3, 5)));

    // either participant may move the meeting
    let moved = lifecycle
        .schedule_match(m.id, partner, schedule_request(4, None))
        .await
        .unwrap();
    assert_eq!(moved.status, "scheduled");
    assert_eq!(moved.scheduled_time, Some(at(2025, 3, 7)));

    let completed = lifecycle.complete_match(m.id, partner).await.unwrap();
    assert_eq!(completed.status, "completed");

    let stored = lifecycle.get_match(m.id).await.unwrap();
    assert_eq!(stored.status, "completed");
    assert_eq!(stored.id, m.id.to_string());

    assert_eq!(
        h.notifier.status_changes(),
        vec![
            (m.id, MatchStatus::Pending, MatchStatus::Scheduled),
            (m.id, MatchStatus::Scheduled, MatchStatus::Scheduled),
            (m.id, MatchStatus::Scheduled, MatchStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_terminal_status_rejects_further_changes() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    lifecycle.complete_match(m.id, sf(1)).await.unwrap();

    let err = lifecycle.skip_match(m.id, sf(1)).await.unwrap_err();
    assert_eq!(err.error_code(), "CANNOT_TRANSITION");
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::CannotTransition {
            from: MatchStatus::Completed,
            to: MatchStatus::Skipped,
        })
    ));

    let err = lifecycle
        .schedule_match(m.id, sf(1), schedule_request(1, None))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CANNOT_TRANSITION");

    let stored = lifecycle.get_match(m.id).await.unwrap();
    assert_eq!(stored.status, "completed");
    assert_eq!(h.notifier.status_changes().len(), 1);
}

#[tokio::test]
async fn test_pending_match_can_be_skipped_or_completed() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    let other = h
        .store
        .matches_for(m.pool_id)
        .into_iter()
        .find(|r| r.id != m.id)
        .unwrap();
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    let skipped = lifecycle.skip_match(m.id, sf(1)).await.unwrap();
    assert_eq!(skipped.status, "skipped");

    let completed = lifecycle
        .complete_match(other.id, other.members[0])
        .await
        .unwrap();
    assert_eq!(completed.status, "completed");
}

#[tokio::test]
async fn test_only_participants_may_act() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    let outsider = [2, 3, 4]
        .into_iter()
        .map(sf)
        .find(|id| !m.includes(*id))
        .unwrap();
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    let err = lifecycle.complete_match(m.id, outsider).await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::NotMatchParticipant(id)) if *id == outsider));

    let stored = lifecycle.get_match(m.id).await.unwrap();
    assert_eq!(stored.status, "pending");
    assert!(h.notifier.status_changes().is_empty());
}

#[tokio::test]
async fn test_concurrent_change_to_compatible_status_is_a_conflict() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    // the partner schedules first; a reschedule from there is still legal
    h.store.set_concurrent_status(MatchStatus::Scheduled);
    let err = lifecycle
        .schedule_match(m.id, sf(1), schedule_request(2, None))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");
    assert!(err.as_domain().is_none());

    let stored = lifecycle.get_match(m.id).await.unwrap();
    assert_eq!(stored.status, "scheduled");
    assert!(h.notifier.status_changes().is_empty());

    // a retry against the stored status succeeds
    let moved = lifecycle
        .schedule_match(m.id, sf(1), schedule_request(2, None))
        .await
        .unwrap();
    assert_eq!(moved.status, "scheduled");
}

#[tokio::test]
async fn test_concurrent_terminal_change_reports_transition() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    h.store.set_concurrent_status(MatchStatus::Completed);
    let err = lifecycle.skip_match(m.id, sf(1)).await.unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::CannotTransition {
            from: MatchStatus::Completed,
            to: MatchStatus::Skipped,
        })
    ));

    let stored = lifecycle.get_match(m.id).await.unwrap();
    assert_eq!(stored.status, "completed");
}

#[tokio::test]
async fn test_unknown_match() {
    let h = TestHarness::new();
    let lifecycle = MatchLifecycleManager::new(&h.ctx);
    let missing = Snowflake::new(123_456);

    let err = lifecycle.get_match(missing).await.unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_MATCH");
    assert!(matches!(err.as_domain(), Some(DomainError::MatchNotFound(id)) if *id == missing));

    let err = lifecycle.skip_match(missing, sf(1)).await.unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_MATCH");
}

#[tokio::test]
async fn test_invalid_schedule_request_rejected() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    let err = lifecycle
        .schedule_match(m.id, sf(1), schedule_request(1, Some("")))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let stored = lifecycle.get_match(m.id).await.unwrap();
    assert_eq!(stored.status, "pending");
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_transition() {
    let h = TestHarness::new();
    let m = generated_match(&h).await;
    h.notifier.set_failing(true);
    let lifecycle = MatchLifecycleManager::new(&h.ctx);

    let completed = lifecycle.complete_match(m.id, sf(1)).await.unwrap();

    assert_eq!(completed.status, "completed");
    assert!(h.notifier.status_changes().is_empty());
}
