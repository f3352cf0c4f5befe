//! PostgreSQL implementation of PoolRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use matchpool_core::entities::Pool;
use matchpool_core::traits::{PoolRepository, RepoResult};
use matchpool_core::value_objects::Snowflake;

use crate::mappers::PoolInsert;
use crate::models::PoolModel;

use super::error::{map_db_error, pool_not_found};

const POOL_COLUMNS: &str = "id, guild_id, frequency, match_size, active, next_match_on, last_match_on, created_at, updated_at";

/// PostgreSQL implementation of PoolRepository
#[derive(Clone)]
pub struct PgPoolRepository {
    pool: PgPool,
}

impl PgPoolRepository {
    /// Create a new PgPoolRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolRepository for PgPoolRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Pool>> {
        let result = sqlx::query_as::<_, PoolModel>(&format!(
            "SELECT {POOL_COLUMNS} FROM pools WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Pool::from))
    }

    #[instrument(skip(self))]
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Pool>> {
        let results = sqlx::query_as::<_, PoolModel>(&format!(
            "SELECT {POOL_COLUMNS} FROM pools WHERE guild_id = $1 ORDER BY id"
        ))
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Pool::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_guild(&self, guild_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pools WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<Pool>> {
        let results = sqlx::query_as::<_, PoolModel>(&format!(
            "SELECT {POOL_COLUMNS} FROM pools WHERE active AND next_match_on <= $1 ORDER BY id"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Pool::from).collect())
    }

    #[instrument(skip(self, pool), fields(pool_id = %pool.id))]
    async fn create(&self, pool: &Pool) -> RepoResult<()> {
        let insert = PoolInsert::new(pool);

        sqlx::query(
            r#"
            INSERT INTO pools (id, guild_id, frequency, match_size, active, next_match_on, last_match_on, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(insert.id)
        .bind(insert.guild_id)
        .bind(insert.frequency)
        .bind(insert.match_size)
        .bind(pool.active)
        .bind(pool.next_match_on)
        .bind(pool.last_match_on)
        .bind(pool.created_at)
        .bind(pool.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, pool), fields(pool_id = %pool.id))]
    async fn update(&self, pool: &Pool) -> RepoResult<()> {
        let insert = PoolInsert::new(pool);

        let result = sqlx::query(
            r#"
            UPDATE pools
            SET frequency = $2, match_size = $3, active = $4, next_match_on = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(insert.id)
        .bind(insert.frequency)
        .bind(insert.match_size)
        .bind(pool.active)
        .bind(pool.next_match_on)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(pool_not_found(pool.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn advance_schedule(
        &self,
        pool_id: Snowflake,
        expected_next: DateTime<Utc>,
        last_match_on: DateTime<Utc>,
        next_match_on: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pools
            SET last_match_on = $3, next_match_on = $4, updated_at = NOW()
            WHERE id = $1 AND next_match_on = $2
            "#,
        )
        .bind(pool_id.into_inner())
        .bind(expected_next)
        .bind(last_match_on)
        .bind(next_match_on)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }
}
