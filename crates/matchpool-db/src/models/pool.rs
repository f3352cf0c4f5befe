//! Pool database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for pools table
#[derive(Debug, Clone, FromRow)]
pub struct PoolModel {
    pub id: i64,
    pub guild_id: i64,
    pub frequency: String,
    pub match_size: i16,
    pub active: bool,
    pub next_match_on: DateTime<Utc>,
    pub last_match_on: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
