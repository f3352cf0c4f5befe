//! Match lifecycle
//!
//! pending -> scheduled -> {completed, skipped}. Completed and skipped are
//! terminal. Every change is persisted with a compare-and-set on the previous
//! status, so two members racing on the same match yield exactly one winner.

use matchpool_core::{DomainError, MatchResult, MatchStatus, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{MatchResponse, ScheduleMatchRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Drives member actions on generated matches
pub struct MatchLifecycleManager<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MatchLifecycleManager<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Attach a meeting time; also used to reschedule
    #[instrument(skip(self, request), fields(match_id = %match_id, member_id = %member_id))]
    pub async fn schedule_match(
        &self,
        match_id: Snowflake,
        member_id: Snowflake,
        request: ScheduleMatchRequest,
    ) -> ServiceResult<MatchResponse> {
        request.validate()?;
        let ScheduleMatchRequest {
            scheduled_time,
            scheduled_event,
        } = request;
        self.apply(match_id, member_id, |result| {
            result.schedule(scheduled_time, scheduled_event)
        })
        .await
    }

    #[instrument(skip(self), fields(match_id = %match_id, member_id = %member_id))]
    pub async fn complete_match(
        &self,
        match_id: Snowflake,
        member_id: Snowflake,
    ) -> ServiceResult<MatchResponse> {
        self.apply(match_id, member_id, |result| {
            result.transition(MatchStatus::Completed)
        })
        .await
    }

    #[instrument(skip(self), fields(match_id = %match_id, member_id = %member_id))]
    pub async fn skip_match(
        &self,
        match_id: Snowflake,
        member_id: Snowflake,
    ) -> ServiceResult<MatchResponse> {
        self.apply(match_id, member_id, |result| {
            result.transition(MatchStatus::Skipped)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_match(&self, match_id: Snowflake) -> ServiceResult<MatchResponse> {
        Ok(MatchResponse::from(self.load(match_id).await?))
    }

    async fn load(&self, match_id: Snowflake) -> ServiceResult<MatchResult> {
        self.ctx
            .match_repo()
            .find_by_id(match_id)
            .await?
            .ok_or_else(|| DomainError::MatchNotFound(match_id).into())
    }

    async fn apply<F>(&self, match_id: Snowflake, member_id: Snowflake, change: F) -> ServiceResult<MatchResponse>
    where
        F: FnOnce(&mut MatchResult) -> Result<(), DomainError>,
    {
        let mut result = self.load(match_id).await?;
        if !result.includes(member_id) {
            return Err(DomainError::NotMatchParticipant(member_id).into());
        }

        let previous = result.status;
        change(&mut result)?;

        if !self.ctx.match_repo().update_status(&result, previous).await? {
            // Another writer moved the status between load and update
            let current = self.load(match_id).await?;
            if !current.status.can_transition_to(result.status) {
                return Err(DomainError::CannotTransition {
                    from: current.status,
                    to: result.status,
                }
                .into());
            }
            warn!(expected = %previous, current = %current.status, "Match status changed concurrently");
            return Err(ServiceError::conflict(format!(
                "Match {match_id} changed from {previous} to {} during the update",
                current.status
            )));
        }

        info!(from = %previous, to = %result.status, "Match status changed");
        notify(self.ctx, &result, previous).await;

        Ok(MatchResponse::from(result))
    }
}

async fn notify(ctx: &ServiceContext, result: &MatchResult, previous: MatchStatus) {
    if let Err(e) = ctx.notifier().notify_status_changed(result, previous).await {
        warn!(
            match_id = %result.id,
            pool_id = %result.pool_id,
            error = %e,
            "Status change notification failed"
        );
    }
}
