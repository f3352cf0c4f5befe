//! Pool service
//!
//! Admin configuration of matching pools.

use chrono::Utc;
use matchpool_core::limits::{is_valid_match_size, MAX_POOLS_PER_GUILD};
use matchpool_core::{DomainError, Frequency, Pool, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreatePoolRequest, PoolResponse, UpdatePoolRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Pool service
pub struct PoolService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PoolService<'a> {
    /// Create a new PoolService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a pool for a guild
    ///
    /// The first round runs at `next_match_on` if given, otherwise one
    /// cadence from now.
    #[instrument(skip(self, request), fields(guild_id = %guild_id))]
    pub async fn create_pool(
        &self,
        guild_id: Snowflake,
        request: CreatePoolRequest,
    ) -> ServiceResult<PoolResponse> {
        request.validate()?;
        let frequency = parse_frequency(&request.frequency)?;
        check_match_size(request.match_size)?;

        let existing = self.ctx.pool_repo().count_by_guild(guild_id).await?;
        if existing >= MAX_POOLS_PER_GUILD as i64 {
            return Err(DomainError::PoolLimitReached {
                max: MAX_POOLS_PER_GUILD,
            }
            .into());
        }

        let next_match_on = request
            .next_match_on
            .unwrap_or_else(|| frequency.next_match_date(Utc::now()));
        let pool = Pool::new(
            self.ctx.generate_id(),
            guild_id,
            frequency,
            request.match_size,
            next_match_on,
        );
        self.ctx.pool_repo().create(&pool).await?;

        info!(
            pool_id = %pool.id,
            frequency = %pool.frequency,
            match_size = pool.match_size,
            next_match_on = %pool.next_match_on,
            "Pool created"
        );

        Ok(PoolResponse::from(&pool))
    }

    /// Change a pool's cadence, group size, active flag, or next round
    #[instrument(skip(self, request), fields(pool_id = %pool_id))]
    pub async fn update_pool(
        &self,
        pool_id: Snowflake,
        request: UpdatePoolRequest,
    ) -> ServiceResult<PoolResponse> {
        request.validate()?;
        let mut pool = self.load(pool_id).await?;

        if let Some(raw) = &request.frequency {
            pool.set_frequency(parse_frequency(raw)?);
        }
        if let Some(match_size) = request.match_size {
            check_match_size(match_size)?;
            pool.set_match_size(match_size);
        }
        if let Some(active) = request.active {
            pool.set_active(active);
        }
        if let Some(next_match_on) = request.next_match_on {
            pool.reschedule(next_match_on);
        }

        self.ctx.pool_repo().update(&pool).await?;
        info!(pool_id = %pool.id, active = pool.active, "Pool updated");

        Ok(PoolResponse::from(&pool))
    }

    /// Get pool by ID
    #[instrument(skip(self))]
    pub async fn get_pool(&self, pool_id: Snowflake) -> ServiceResult<PoolResponse> {
        Ok(PoolResponse::from(self.load(pool_id).await?))
    }

    /// All pools of a guild, oldest first
    #[instrument(skip(self))]
    pub async fn list_guild_pools(&self, guild_id: Snowflake) -> ServiceResult<Vec<PoolResponse>> {
        let pools = self.ctx.pool_repo().find_by_guild(guild_id).await?;
        Ok(pools.iter().map(PoolResponse::from).collect())
    }

    async fn load(&self, pool_id: Snowflake) -> ServiceResult<Pool> {
        self.ctx
            .pool_repo()
            .find_by_id(pool_id)
            .await?
            .ok_or_else(|| DomainError::PoolNotFound(pool_id).into())
    }
}

fn parse_frequency(raw: &str) -> Result<Frequency, DomainError> {
    Frequency::parse(raw).ok_or_else(|| DomainError::InvalidFrequency(raw.to_string()))
}

fn check_match_size(match_size: u8) -> Result<(), DomainError> {
    if is_valid_match_size(match_size) {
        Ok(())
    } else {
        Err(DomainError::InvalidMatchSize(match_size))
    }
}
