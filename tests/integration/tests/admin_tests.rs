//! Pool administration, membership, and round query tests
//!
//! Run with: cargo test -p integration-tests --test admin_tests

use chrono::{Duration, Utc};
use integration_tests::{at, sf, sfs, TestHarness};
use matchpool_core::{DomainError, Snowflake};
use matchpool_service::dto::{
    CreatePoolRequest, JoinPoolRequest, UpdateMembershipRequest, UpdatePoolRequest,
};
use matchpool_service::{MembershipService, PoolService, RoundQueryService};

const GUILD: i64 = 77;

fn create_request(frequency: &str, match_size: u8) -> CreatePoolRequest {
    CreatePoolRequest {
        frequency: frequency.to_string(),
        match_size,
        next_match_on: None,
    }
}

fn join_request(member_id: i64, excluded: &[i64]) -> JoinPoolRequest {
    JoinPoolRequest {
        user_id: sf(member_id + 1000),
        excluded_members: sfs(excluded),
    }
}

fn pool_id(response: &matchpool_service::dto::PoolResponse) -> Snowflake {
    Snowflake::parse(&response.id).unwrap()
}

// ============================================================================
// Pools
// ============================================================================

#[tokio::test]
async fn test_create_pool_defaults_first_round_to_one_cadence() {
    let h = TestHarness::new();
    let before = Utc::now();

    let pool = PoolService::new(&h.ctx)
        .create_pool(sf(GUILD), create_request("Weekly", 3))
        .await
        .unwrap();

    assert_eq!(pool.guild_id, GUILD.to_string());
    assert_eq!(pool.frequency, "weekly");
    assert_eq!(pool.match_size, 3);
    assert!(pool.active);
    assert!(pool.last_match_on.is_none());
    assert!(pool.next_match_on >= before + Duration::days(7));
    assert!(pool.next_match_on <= Utc::now() + Duration::days(7));
}

#[tokio::test]
async fn test_create_pool_with_explicit_start() {
    let h = TestHarness::new();
    let start = at(2025, 6, 2);

    let pool = PoolService::new(&h.ctx)
        .create_pool(
            sf(GUILD),
            CreatePoolRequest {
                frequency: "biweekly".to_string(),
                match_size: 2,
                next_match_on: Some(start),
            },
        )
        .await
        .unwrap();

    assert_eq!(pool.next_match_on, start);
    assert_eq!(h.store.pool(pool_id(&pool)).unwrap().next_match_on, start);
}

#[tokio::test]
async fn test_create_pool_rejects_bad_settings() {
    let h = TestHarness::new();
    let service = PoolService::new(&h.ctx);

    let err = service
        .create_pool(sf(GUILD), create_request("weekly", 7))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::InvalidMatchSize(7))));
    assert_eq!(err.error_code(), "INVALID_MATCH_SIZE");

    let err = service
        .create_pool(sf(GUILD), create_request("weekly", 1))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::InvalidMatchSize(1))));

    let err = service
        .create_pool(sf(GUILD), create_request("daily", 2))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::InvalidFrequency(_))));

    assert!(service.list_guild_pools(sf(GUILD)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pool_limit_per_guild() {
    let h = TestHarness::new();
    let service = PoolService::new(&h.ctx);

    for _ in 0..10 {
        service
            .create_pool(sf(GUILD), create_request("monthly", 2))
            .await
            .unwrap();
    }

    let err = service
        .create_pool(sf(GUILD), create_request("monthly", 2))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::PoolLimitReached { max: 10 })));

    // other guilds are unaffected
    service
        .create_pool(sf(GUILD + 1), create_request("monthly", 2))
        .await
        .unwrap();
    assert_eq!(service.list_guild_pools(sf(GUILD)).await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_update_pool() {
    let h = TestHarness::new();
    let service = PoolService::new(&h.ctx);
    let created = service
        .create_pool(sf(GUILD), create_request("weekly", 2))
        .await
        .unwrap();
    let id = pool_id(&created);

    let updated = service
        .update_pool(
            id,
            UpdatePoolRequest {
                frequency: Some("MONTHLY".to_string()),
                match_size: Some(4),
                active: Some(false),
                next_match_on: Some(at(2025, 9, 1)),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.frequency, "monthly");
    assert_eq!(updated.match_size, 4);
    assert!(!updated.active);
    assert_eq!(updated.next_match_on, at(2025, 9, 1));

    // a rejected update leaves the stored pool untouched
    let err = service
        .update_pool(
            id,
            UpdatePoolRequest {
                match_size: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_MATCH_SIZE");
    assert_eq!(service.get_pool(id).await.unwrap().match_size, 4);
}

#[tokio::test]
async fn test_unknown_pool() {
    let h = TestHarness::new();
    let service = PoolService::new(&h.ctx);

    let err = service.get_pool(sf(404)).await.unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_POOL");
    assert!(matches!(err.as_domain(), Some(DomainError::PoolNotFound(_))));

    let err = service
        .update_pool(sf(404), UpdatePoolRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_POOL");
}

// ============================================================================
// Membership
// ============================================================================

#[tokio::test]
async fn test_join_leave_rejoin() {
    let h = TestHarness::new();
    let pool = h.seed_pool(1, 2, at(2025, 3, 3)).await;
    let service = MembershipService::new(&h.ctx);

    let joined = service
        .join_pool(pool.id, sf(5), join_request(5, &[6, 6, 7]))
        .await
        .unwrap();
    assert!(joined.active);
    assert_eq!(joined.user_id, "1005");
    assert_eq!(joined.excluded_members, vec!["6".to_string(), "7".to_string()]);

    let err = service
        .join_pool(pool.id, sf(5), join_request(5, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::AlreadyMember)));
    assert_eq!(err.error_code(), "ALREADY_MEMBER");

    let left = service
        .update_membership(
            pool.id,
            sf(5),
            UpdateMembershipRequest {
                active: Some(false),
                excluded_members: None,
            },
        )
        .await
        .unwrap();
    assert!(!left.active);
    assert_eq!(left.excluded_members.len(), 2);

    let rejoined = service
        .join_pool(pool.id, sf(5), join_request(5, &[8]))
        .await
        .unwrap();
    assert!(rejoined.active);
    assert_eq!(rejoined.excluded_members, vec!["8".to_string()]);

    let members = service.list_members(pool.id).await.unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn test_member_limit_per_pool() {
    let h = TestHarness::new();
    let pool = h.seed_pool(1, 2, at(2025, 3, 3)).await;
    let ids: Vec<i64> = (1..=100).collect();
    h.seed_members(1, &ids).await;
    let service = MembershipService::new(&h.ctx);

    let err = service
        .join_pool(pool.id, sf(101), join_request(101, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::MemberPoolLimitReached { max: 100 })));

    // leaving frees a slot, and the leaver cannot reactivate once it is taken
    service
        .update_membership(
            pool.id,
            sf(1),
            UpdateMembershipRequest {
                active: Some(false),
                excluded_members: None,
            },
        )
        .await
        .unwrap();
    service
        .join_pool(pool.id, sf(101), join_request(101, &[]))
        .await
        .unwrap();

    let err = service
        .update_membership(
            pool.id,
            sf(1),
            UpdateMembershipRequest {
                active: Some(true),
                excluded_members: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::MemberPoolLimitReached { .. })));
}

#[tokio::test]
async fn test_exclusion_rules() {
    let h = TestHarness::new();
    let pool = h.seed_pool(1, 2, at(2025, 3, 3)).await;
    let service = MembershipService::new(&h.ctx);

    let too_many: Vec<i64> = (100..121).collect();
    let err = service
        .join_pool(pool.id, sf(5), join_request(5, &too_many))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::ExclusionLimitReached { max: 20 })));

    let err = service
        .join_pool(pool.id, sf(5), join_request(5, &[5]))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::ValidationError(_))));

    assert!(service.list_members(pool.id).await.unwrap().is_empty());

    service
        .join_pool(pool.id, sf(5), join_request(5, &too_many[..20]))
        .await
        .unwrap();
    let updated = service
        .update_membership(
            pool.id,
            sf(5),
            UpdateMembershipRequest {
                active: None,
                excluded_members: Some(Vec::new()),
            },
        )
        .await
        .unwrap();
    assert!(updated.excluded_members.is_empty());
}

#[tokio::test]
async fn test_membership_requires_pool_and_member() {
    let h = TestHarness::new();
    let service = MembershipService::new(&h.ctx);

    let err = service
        .join_pool(sf(404), sf(5), join_request(5, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::PoolNotFound(_))));

    let pool = h.seed_pool(1, 2, at(2025, 3, 3)).await;
    let err = service
        .update_membership(pool.id, sf(5), UpdateMembershipRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::PoolMemberNotFound { .. })));
    assert_eq!(err.error_code(), "UNKNOWN_POOL_MEMBER");
}

#[tokio::test]
async fn test_new_member_is_matched_next_round() {
    let h = TestHarness::new();
    let now = at(2025, 3, 3);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1]).await;
    MembershipService::new(&h.ctx)
        .join_pool(pool.id, sf(2), join_request(2, &[]))
        .await
        .unwrap();

    let outcomes = h.scheduler().run_due_rounds(now).await.unwrap();

    assert!(outcomes[0].is_generated());
    assert_eq!(
        h.store.groups_for(pool.id, outcomes[0].round.as_ref().unwrap()),
        vec![sfs(&[1, 2])]
    );
}

// ============================================================================
// Round queries
// ============================================================================

#[tokio::test]
async fn test_round_info_and_listing() {
    let h = TestHarness::new();
    let now = at(2024, 12, 30);
    let pool = h.seed_pool(1, 2, now).await;
    h.seed_members(1, &[1, 2, 3, 4]).await;
    h.scheduler().run_due_rounds(now).await.unwrap();
    let rounds = RoundQueryService::new(&h.ctx);

    let info = rounds.get_round_info(pool.id, "2025-W01").await.unwrap();
    assert_eq!(info.round, "2025-W01");
    assert_eq!(info.ran_on, now);
    assert_eq!(info.matches.len(), 2);
    assert!(info.matches.iter().all(|m| m.status == "pending"));

    let listed = rounds.list_rounds(pool.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].round, "2025-W01");
    assert_eq!(listed[0].match_count, 2);
    assert_eq!(listed[0].ran_on, now);
}

#[tokio::test]
async fn test_round_queries_reject_bad_input() {
    let h = TestHarness::new();
    let pool = h.seed_pool(1, 2, at(2025, 3, 3)).await;
    let rounds = RoundQueryService::new(&h.ctx);

    let err = rounds.get_round_info(pool.id, "2025-W05").await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::RoundNotFound { .. })));
    assert_eq!(err.error_code(), "UNKNOWN_ROUND");

    let err = rounds.get_round_info(pool.id, "last week").await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let err = rounds.get_round_info(sf(404), "2025-W05").await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::PoolNotFound(_))));

    let err = rounds.list_rounds(sf(404)).await.unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_POOL");
    assert!(rounds.list_rounds(pool.id).await.unwrap().is_empty());
}
