//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use matchpool_core::entities::{MatchResult, MatchRoundInfo, Pool, PoolMember};
use matchpool_core::traits::RoundSummary;

use super::responses::{
    MatchResponse, MatchRoundInfoResponse, PoolMemberResponse, PoolResponse, RoundSummaryResponse,
};

// ============================================================================
// Pool Mappers
// ============================================================================

impl From<&Pool> for PoolResponse {
    fn from(pool: &Pool) -> Self {
        Self {
            id: pool.id.to_string(),
            guild_id: pool.guild_id.to_string(),
            frequency: pool.frequency.as_str().to_string(),
            match_size: pool.match_size,
            active: pool.active,
            next_match_on: pool.next_match_on,
            last_match_on: pool.last_match_on,
            created_at: pool.created_at,
        }
    }
}

impl From<Pool> for PoolResponse {
    fn from(pool: Pool) -> Self {
        Self::from(&pool)
    }
}

impl From<&PoolMember> for PoolMemberResponse {
    fn from(member: &PoolMember) -> Self {
        Self {
            pool_id: member.pool_id.to_string(),
            member_id: member.member_id.to_string(),
            user_id: member.user_id.to_string(),
            active: member.active,
            excluded_members: member.excluded_members.iter().map(ToString::to_string).collect(),
            joined_at: member.joined_at,
        }
    }
}

impl From<PoolMember> for PoolMemberResponse {
    fn from(member: PoolMember) -> Self {
        Self::from(&member)
    }
}

// ============================================================================
// Match Mappers
// ============================================================================

impl From<&MatchResult> for MatchResponse {
    fn from(result: &MatchResult) -> Self {
        Self {
            id: result.id.to_string(),
            pool_id: result.pool_id.to_string(),
            match_round: result.match_round.to_string(),
            members: result.members.iter().map(ToString::to_string).collect(),
            status: result.status.as_str().to_string(),
            scheduled_event: result.scheduled_event.clone(),
            scheduled_time: result.scheduled_time,
            created_at: result.created_at,
        }
    }
}

impl From<MatchResult> for MatchResponse {
    fn from(result: MatchResult) -> Self {
        Self::from(&result)
    }
}

impl From<MatchRoundInfo> for MatchRoundInfoResponse {
    fn from(info: MatchRoundInfo) -> Self {
        Self {
            round: info.round.to_string(),
            ran_on: info.ran_on,
            matches: info.matches.iter().map(MatchResponse::from).collect(),
        }
    }
}

impl From<RoundSummary> for RoundSummaryResponse {
    fn from(summary: RoundSummary) -> Self {
        Self {
            round: summary.round.to_string(),
            ran_on: summary.ran_on,
            match_count: summary.match_count,
        }
    }
}
