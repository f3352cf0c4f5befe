//! PostgreSQL implementation of MatchResultRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use matchpool_core::entities::{MatchResult, MatchStatus};
use matchpool_core::error::DomainError;
use matchpool_core::traits::{
    MatchResultRepository, RepoResult, RoundCommit, RoundCommitted, RoundSummary,
};
use matchpool_core::value_objects::{MatchRound, Snowflake};

use crate::mappers::{results_from_models, MatchResultInsert};
use crate::models::{MatchResultModel, RoundSummaryModel};

use super::error::{map_db_error, map_unique_violation};

const MATCH_COLUMNS: &str = "id, pool_id, match_round, members, status, scheduled_event, scheduled_time, created_at, updated_at";

/// PostgreSQL implementation of MatchResultRepository
#[derive(Clone)]
pub struct PgMatchResultRepository {
    pool: PgPool,
}

impl PgMatchResultRepository {
    /// Create a new PgMatchResultRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchResultRepository for PgMatchResultRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<MatchResult>> {
        let result = sqlx::query_as::<_, MatchResultModel>(&format!(
            "SELECT {MATCH_COLUMNS} FROM match_results WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(MatchResult::try_from).transpose()
    }

    #[instrument(skip(self), fields(round = %round))]
    async fn find_by_round(&self, pool_id: Snowflake, round: &MatchRound) -> RepoResult<Vec<MatchResult>> {
        let results = sqlx::query_as::<_, MatchResultModel>(&format!(
            "SELECT {MATCH_COLUMNS} FROM match_results WHERE pool_id = $1 AND match_round = $2 ORDER BY id"
        ))
        .bind(pool_id.into_inner())
        .bind(round.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results_from_models(results)
    }

    #[instrument(skip(self), fields(round = %round))]
    async fn round_exists(&self, pool_id: Snowflake, round: &MatchRound) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pool_rounds WHERE pool_id = $1 AND match_round = $2)",
        )
        .bind(pool_id.into_inner())
        .bind(round.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_since(&self, pool_id: Snowflake, since: DateTime<Utc>) -> RepoResult<Vec<MatchResult>> {
        let results = sqlx::query_as::<_, MatchResultModel>(&format!(
            "SELECT {MATCH_COLUMNS} FROM match_results WHERE pool_id = $1 AND created_at >= $2 ORDER BY created_at, id"
        ))
        .bind(pool_id.into_inner())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results_from_models(results)
    }

    #[instrument(skip(self))]
    async fn list_rounds(&self, pool_id: Snowflake) -> RepoResult<Vec<RoundSummary>> {
        let rows = sqlx::query_as::<_, RoundSummaryModel>(
            r#"
            SELECT r.match_round, r.ran_on, COUNT(m.id) AS match_count
            FROM pool_rounds r
            LEFT JOIN match_results m ON m.pool_id = r.pool_id AND m.match_round = r.match_round
            WHERE r.pool_id = $1
            GROUP BY r.match_round, r.ran_on
            ORDER BY r.ran_on DESC, r.match_round DESC
            "#,
        )
        .bind(pool_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(RoundSummary {
                    round: MatchRound::parse(&row.match_round)
                        .map_err(|e| DomainError::DatabaseError(e.to_string()))?,
                    ran_on: row.ran_on,
                    match_count: row.match_count,
                })
            })
            .collect()
    }

    #[instrument(skip(self, commit), fields(pool_id = %commit.pool_id, round = %commit.round, matches = commit.matches.len()))]
    async fn commit_round(&self, commit: &RoundCommit) -> RepoResult<RoundCommitted> {
        let already_generated = || DomainError::RoundAlreadyGenerated {
            pool_id: commit.pool_id,
            round: commit.round.clone(),
        };
        let pool_id = commit.pool_id.into_inner();

        // Dropping `tx` on any early return rolls everything back
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("INSERT INTO pool_rounds (pool_id, match_round, ran_on) VALUES ($1, $2, $3)")
            .bind(pool_id)
            .bind(commit.round.as_str())
            .bind(commit.last_match_on)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, already_generated))?;

        let expired = sqlx::query(
            r#"
            UPDATE match_results
            SET status = 'skipped', updated_at = NOW()
            WHERE pool_id = $1 AND match_round <> $2 AND status IN ('pending', 'scheduled')
            "#,
        )
        .bind(pool_id)
        .bind(commit.round.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        for result in &commit.matches {
            let insert = MatchResultInsert::new(result);
            sqlx::query(
                r#"
                INSERT INTO match_results (id, pool_id, match_round, members, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(insert.id)
            .bind(insert.pool_id)
            .bind(insert.match_round)
            .bind(&insert.members)
            .bind(insert.status)
            .bind(result.created_at)
            .bind(result.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        let advanced = sqlx::query(
            r#"
            UPDATE pools
            SET last_match_on = $3, next_match_on = $4, updated_at = NOW()
            WHERE id = $1 AND next_match_on = $2
            "#,
        )
        .bind(pool_id)
        .bind(commit.expected_next)
        .bind(commit.last_match_on)
        .bind(commit.next_match_on)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if advanced == 0 {
            debug!("Pool schedule moved concurrently; rolling back round");
            return Err(already_generated());
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(RoundCommitted { expired })
    }

    #[instrument(skip(self, result), fields(match_id = %result.id, status = %result.status))]
    async fn update_status(&self, result: &MatchResult, expected: MatchStatus) -> RepoResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE match_results
            SET status = $2, scheduled_event = $3, scheduled_time = $4, updated_at = NOW()
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(result.id.into_inner())
        .bind(result.status.as_str())
        .bind(&result.scheduled_event)
        .bind(result.scheduled_time)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(updated.rows_affected() == 1)
    }
}
