//! Membership service
//!
//! Joining, leaving, and exclusion management for pool members.

use std::collections::BTreeSet;

use matchpool_core::limits::{MAX_EXCLUSIONS_PER_MEMBER, MAX_MEMBERS_PER_POOL};
use matchpool_core::{DomainError, PoolMember, Snowflake};
use tracing::{info, instrument};

use crate::dto::{JoinPoolRequest, PoolMemberResponse, UpdateMembershipRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Enroll a member, or reactivate one who left earlier
    #[instrument(skip(self, request), fields(pool_id = %pool_id, member_id = %member_id))]
    pub async fn join_pool(
        &self,
        pool_id: Snowflake,
        member_id: Snowflake,
        request: JoinPoolRequest,
    ) -> ServiceResult<PoolMemberResponse> {
        self.ensure_pool(pool_id).await?;
        let exclusions = validate_exclusions(member_id, request.excluded_members)?;

        let member = match self.ctx.member_repo().find(pool_id, member_id).await? {
            Some(member) if member.active => return Err(DomainError::AlreadyMember.into()),
            Some(mut member) => {
                self.ensure_capacity(pool_id).await?;
                member.set_exclusions(exclusions);
                member.set_active(true);
                self.ctx.member_repo().update(&member).await?;
                info!("Member rejoined pool");
                member
            }
            None => {
                self.ensure_capacity(pool_id).await?;
                let member = PoolMember::new(self.ctx.generate_id(), pool_id, member_id, request.user_id)
                    .with_exclusions(exclusions);
                self.ctx.member_repo().create(&member).await?;
                info!(user_id = %member.user_id, "Member joined pool");
                member
            }
        };

        Ok(PoolMemberResponse::from(member))
    }

    /// Leave, rejoin, or replace the exclusion set
    #[instrument(skip(self, request), fields(pool_id = %pool_id, member_id = %member_id))]
    pub async fn update_membership(
        &self,
        pool_id: Snowflake,
        member_id: Snowflake,
        request: UpdateMembershipRequest,
    ) -> ServiceResult<PoolMemberResponse> {
        let mut member = self
            .ctx
            .member_repo()
            .find(pool_id, member_id)
            .await?
            .ok_or(DomainError::PoolMemberNotFound { pool_id, member_id })?;

        if let Some(excluded) = request.excluded_members {
            member.set_exclusions(validate_exclusions(member_id, excluded)?);
        }
        if let Some(active) = request.active {
            if active && !member.active {
                self.ensure_capacity(pool_id).await?;
            }
            member.set_active(active);
        }

        self.ctx.member_repo().update(&member).await?;
        info!(
            active = member.active,
            exclusions = member.excluded_members.len(),
            "Membership updated"
        );

        Ok(PoolMemberResponse::from(member))
    }

    /// Every membership of a pool, active or not, by member ID
    #[instrument(skip(self))]
    pub async fn list_members(&self, pool_id: Snowflake) -> ServiceResult<Vec<PoolMemberResponse>> {
        self.ensure_pool(pool_id).await?;
        let members = self.ctx.member_repo().find_by_pool(pool_id).await?;
        Ok(members.iter().map(PoolMemberResponse::from).collect())
    }

    async fn ensure_pool(&self, pool_id: Snowflake) -> ServiceResult<()> {
        self.ctx
            .pool_repo()
            .find_by_id(pool_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::PoolNotFound(pool_id).into())
    }

    /// Early rejection before any write
    ///
    /// Two joins can both pass this check; the member repository repeats it
    /// atomically with the insert or reactivation.
    async fn ensure_capacity(&self, pool_id: Snowflake) -> ServiceResult<()> {
        let active = self.ctx.member_repo().count_active(pool_id).await?;
        if active >= MAX_MEMBERS_PER_POOL as i64 {
            return Err(DomainError::MemberPoolLimitReached {
                max: MAX_MEMBERS_PER_POOL,
            }
            .into());
        }
        Ok(())
    }
}

/// Deduplicate and bound a member's exclusion list
fn validate_exclusions(
    member_id: Snowflake,
    excluded: Vec<Snowflake>,
) -> Result<BTreeSet<Snowflake>, DomainError> {
    let exclusions: BTreeSet<Snowflake> = excluded.into_iter().collect();
    if exclusions.contains(&member_id) {
        return Err(DomainError::ValidationError(
            "A member cannot exclude themselves".to_string(),
        ));
    }
    if exclusions.len() > MAX_EXCLUSIONS_PER_MEMBER {
        return Err(DomainError::ExclusionLimitReached {
            max: MAX_EXCLUSIONS_PER_MEMBER,
        });
    }
    Ok(exclusions)
}
