//! Response DTOs
//!
//! All response DTOs implement `Serialize`.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Pool Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolResponse {
    pub id: String,
    pub guild_id: String,
    pub frequency: String,
    pub match_size: u8,
    pub active: bool,
    pub next_match_on: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_match_on: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolMemberResponse {
    pub pool_id: String,
    pub member_id: String,
    pub user_id: String,
    pub active: bool,
    pub excluded_members: Vec<String>,
    pub joined_at: DateTime<Utc>,
}

// ============================================================================
// Match Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResponse {
    pub id: String,
    pub pool_id: String,
    pub match_round: String,
    pub members: Vec<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Every match produced for one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRoundInfoResponse {
    pub round: String,
    pub ran_on: DateTime<Utc>,
    pub matches: Vec<MatchResponse>,
}

/// One entry of a pool's round history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSummaryResponse {
    pub round: String,
    pub ran_on: DateTime<Utc>,
    pub match_count: i64,
}
