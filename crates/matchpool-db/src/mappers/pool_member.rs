//! PoolMember entity <-> model mapper

use std::collections::BTreeSet;

use matchpool_core::entities::PoolMember;
use matchpool_core::value_objects::Snowflake;

use crate::models::PoolMemberModel;

/// Convert PoolMemberModel to PoolMember entity
impl From<PoolMemberModel> for PoolMember {
    fn from(model: PoolMemberModel) -> Self {
        PoolMember {
            id: Snowflake::new(model.id),
            pool_id: Snowflake::new(model.pool_id),
            member_id: Snowflake::new(model.member_id),
            user_id: Snowflake::new(model.user_id),
            active: model.active,
            excluded_members: model.excluded_members.into_iter().map(Snowflake::new).collect(),
            joined_at: model.joined_at,
            updated_at: model.updated_at,
        }
    }
}

/// Exclusion set as a `BIGINT[]` value, ascending
pub fn exclusions_to_db(exclusions: &BTreeSet<Snowflake>) -> Vec<i64> {
    exclusions.iter().map(|id| id.into_inner()).collect()
}

/// Convert PoolMember entity reference to values for database insertion
pub struct PoolMemberInsert {
    pub id: i64,
    pub pool_id: i64,
    pub member_id: i64,
    pub user_id: i64,
    pub excluded_members: Vec<i64>,
}

impl PoolMemberInsert {
    pub fn new(member: &PoolMember) -> Self {
        Self {
            id: member.id.into_inner(),
            pool_id: member.pool_id.into_inner(),
            member_id: member.member_id.into_inner(),
            user_id: member.user_id.into_inner(),
            excluded_members: exclusions_to_db(&member.excluded_members),
        }
    }
}
