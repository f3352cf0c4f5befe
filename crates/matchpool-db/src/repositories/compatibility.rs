//! Compatibility scores read from the `compatibility_scores` table

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use matchpool_core::limits::NEUTRAL_COMPATIBILITY;
use matchpool_core::matching::pair_key;
use matchpool_core::traits::{CompatibilityProvider, RepoResult};
use matchpool_core::value_objects::Snowflake;

use super::error::map_db_error;

/// Compatibility provider backed by precomputed scores in Postgres
///
/// Pairs without a stored score are neutral.
#[derive(Clone)]
pub struct PgCompatibilityProvider {
    pool: PgPool,
}

impl PgCompatibilityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompatibilityProvider for PgCompatibilityProvider {
    #[instrument(skip(self))]
    async fn score(&self, user_a: Snowflake, user_b: Snowflake) -> RepoResult<f64> {
        let (a, b) = pair_key(user_a, user_b);
        let score = sqlx::query_scalar::<_, f64>(
            "SELECT score FROM compatibility_scores WHERE user_a = $1 AND user_b = $2",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(score.unwrap_or(NEUTRAL_COMPATIBILITY))
    }

    #[instrument(skip(self, users), fields(users = users.len()))]
    async fn score_all(&self, users: &[Snowflake]) -> RepoResult<Vec<(Snowflake, Snowflake, f64)>> {
        let ids: Vec<i64> = users.iter().map(|id| id.into_inner()).collect();

        let rows = sqlx::query_as::<_, (i64, i64, f64)>(
            r#"
            SELECT user_a, user_b, score
            FROM compatibility_scores
            WHERE user_a = ANY($1) AND user_b = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|(a, b, score)| (Snowflake::new(a), Snowflake::new(b), score))
            .collect())
    }
}
