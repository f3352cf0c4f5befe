//! Pool entity <-> model mapper

use matchpool_core::entities::Pool;
use matchpool_core::value_objects::{Frequency, Snowflake};

use crate::models::PoolModel;

/// Convert PoolModel to Pool entity
///
/// Unknown frequencies fall back to weekly.
impl From<PoolModel> for Pool {
    fn from(model: PoolModel) -> Self {
        Pool {
            id: Snowflake::new(model.id),
            guild_id: Snowflake::new(model.guild_id),
            frequency: Frequency::parse_or_weekly(&model.frequency),
            match_size: u8::try_from(model.match_size).unwrap_or(0),
            active: model.active,
            next_match_on: model.next_match_on,
            last_match_on: model.last_match_on,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert Pool entity reference to values for database insertion
pub struct PoolInsert {
    pub id: i64,
    pub guild_id: i64,
    pub frequency: &'static str,
    pub match_size: i16,
}

impl PoolInsert {
    pub fn new(pool: &Pool) -> Self {
        Self {
            id: pool.id.into_inner(),
            guild_id: pool.guild_id.into_inner(),
            frequency: pool.frequency.as_str(),
            match_size: i16::from(pool.match_size),
        }
    }
}
