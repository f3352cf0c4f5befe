//! Round queries

use matchpool_core::{DomainError, MatchRound, MatchRoundInfo, Snowflake};
use tracing::instrument;

use crate::dto::{MatchRoundInfoResponse, RoundSummaryResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Read side of generated rounds
pub struct RoundQueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoundQueryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Matches of one round, identified by its `YYYY-Www` key
    #[instrument(skip(self))]
    pub async fn get_round_info(
        &self,
        pool_id: Snowflake,
        round: &str,
    ) -> ServiceResult<MatchRoundInfoResponse> {
        let round = MatchRound::parse(round).map_err(|e| ServiceError::validation(e.to_string()))?;
        self.ensure_pool(pool_id).await?;

        let matches = self.ctx.match_repo().find_by_round(pool_id, &round).await?;
        let Some(ran_on) = matches.iter().map(|m| m.created_at).min() else {
            return Err(DomainError::RoundNotFound { pool_id, round }.into());
        };

        Ok(MatchRoundInfoResponse::from(MatchRoundInfo {
            round,
            ran_on,
            matches,
        }))
    }

    /// Generated rounds of a pool, newest first
    #[instrument(skip(self))]
    pub async fn list_rounds(&self, pool_id: Snowflake) -> ServiceResult<Vec<RoundSummaryResponse>> {
        self.ensure_pool(pool_id).await?;
        let rounds = self.ctx.match_repo().list_rounds(pool_id).await?;
        Ok(rounds.into_iter().map(RoundSummaryResponse::from).collect())
    }

    async fn ensure_pool(&self, pool_id: Snowflake) -> ServiceResult<()> {
        match self.ctx.pool_repo().find_by_id(pool_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::PoolNotFound(pool_id).into()),
        }
    }
}
