//! Match result database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for match_results table
#[derive(Debug, Clone, FromRow)]
pub struct MatchResultModel {
    pub id: i64,
    pub pool_id: i64,
    pub match_round: String,
    pub members: Vec<i64>,
    pub status: String,
    pub scheduled_event: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// pool_rounds row joined with its match count
#[derive(Debug, Clone, FromRow)]
pub struct RoundSummaryModel {
    pub match_round: String,
    pub ran_on: DateTime<Utc>,
    pub match_count: i64,
}
