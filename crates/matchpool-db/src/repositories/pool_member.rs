//! PostgreSQL implementation of PoolMemberRepository and MembershipProvider

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use matchpool_core::entities::PoolMember;
use matchpool_core::error::DomainError;
use matchpool_core::limits::MAX_MEMBERS_PER_POOL;
use matchpool_core::traits::{MembershipProvider, PoolMemberRepository, RepoResult};
use matchpool_core::value_objects::Snowflake;

use crate::mappers::{exclusions_to_db, PoolMemberInsert};
use crate::models::PoolMemberModel;

use super::error::{map_db_error, map_unique_violation, pool_member_not_found};

/// PostgreSQL implementation of PoolMemberRepository
#[derive(Clone)]
pub struct PgPoolMemberRepository {
    pool: PgPool,
}

impl PgPoolMemberRepository {
    /// Create a new PgPoolMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolMemberRepository for PgPoolMemberRepository {
    #[instrument(skip(self))]
    async fn find(&self, pool_id: Snowflake, member_id: Snowflake) -> RepoResult<Option<PoolMember>> {
        let result = sqlx::query_as::<_, PoolMemberModel>(
            r#"
            SELECT id, pool_id, member_id, user_id, active, excluded_members, joined_at, updated_at
            FROM pool_members
            WHERE pool_id = $1 AND member_id = $2
            "#,
        )
        .bind(pool_id.into_inner())
        .bind(member_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PoolMember::from))
    }

    #[instrument(skip(self))]
    async fn find_by_pool(&self, pool_id: Snowflake) -> RepoResult<Vec<PoolMember>> {
        let results = sqlx::query_as::<_, PoolMemberModel>(
            r#"
            SELECT id, pool_id, member_id, user_id, active, excluded_members, joined_at, updated_at
            FROM pool_members
            WHERE pool_id = $1
            ORDER BY member_id
            "#,
        )
        .bind(pool_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PoolMember::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_active(&self, pool_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pool_members WHERE pool_id = $1 AND active",
        )
        .bind(pool_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, member), fields(pool_id = %member.pool_id, member_id = %member.member_id))]
    async fn create(&self, member: &PoolMember) -> RepoResult<()> {
        let insert = PoolMemberInsert::new(member);

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        if member.active {
            reserve_slot(&mut tx, member.pool_id, member.member_id).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO pool_members (id, pool_id, member_id, user_id, active, excluded_members, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(insert.id)
        .bind(insert.pool_id)
        .bind(insert.member_id)
        .bind(insert.user_id)
        .bind(member.active)
        .bind(&insert.excluded_members)
        .bind(member.joined_at)
        .bind(member.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, member), fields(pool_id = %member.pool_id, member_id = %member.member_id))]
    async fn update(&self, member: &PoolMember) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        if member.active {
            reserve_slot(&mut tx, member.pool_id, member.member_id).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE pool_members
            SET active = $3, excluded_members = $4, updated_at = NOW()
            WHERE pool_id = $1 AND member_id = $2
            "#,
        )
        .bind(member.pool_id.into_inner())
        .bind(member.member_id.into_inner())
        .bind(member.active)
        .bind(exclusions_to_db(&member.excluded_members))
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(pool_member_not_found(member.pool_id, member.member_id));
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}

/// Lock the pool row and refuse one more active member past the limit
///
/// The lock serializes concurrent joins to one pool until the caller's
/// transaction ends, so the count cannot go stale before the write.
async fn reserve_slot(conn: &mut PgConnection, pool_id: Snowflake, member_id: Snowflake) -> RepoResult<()> {
    sqlx::query("SELECT id FROM pools WHERE id = $1 FOR UPDATE")
        .bind(pool_id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

    let others = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM pool_members WHERE pool_id = $1 AND active AND member_id <> $2",
    )
    .bind(pool_id.into_inner())
    .bind(member_id.into_inner())
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)?;

    if others >= MAX_MEMBERS_PER_POOL as i64 {
        return Err(DomainError::MemberPoolLimitReached {
            max: MAX_MEMBERS_PER_POOL,
        });
    }
    Ok(())
}

#[async_trait]
impl MembershipProvider for PgPoolMemberRepository {
    #[instrument(skip(self))]
    async fn active_members(&self, pool_id: Snowflake) -> RepoResult<Vec<PoolMember>> {
        let results = sqlx::query_as::<_, PoolMemberModel>(
            r#"
            SELECT id, pool_id, member_id, user_id, active, excluded_members, joined_at, updated_at
            FROM pool_members
            WHERE pool_id = $1 AND active
            ORDER BY member_id
            "#,
        )
        .bind(pool_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PoolMember::from).collect())
    }
}
