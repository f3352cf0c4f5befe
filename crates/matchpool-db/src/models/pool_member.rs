//! Pool member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for pool_members table
#[derive(Debug, Clone, FromRow)]
pub struct PoolMemberModel {
    pub id: i64,
    pub pool_id: i64,
    pub member_id: i64,
    pub user_id: i64,
    pub active: bool,
    pub excluded_members: Vec<i64>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
