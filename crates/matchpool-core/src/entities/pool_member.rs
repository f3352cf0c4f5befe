//! PoolMember entity - a guild member's enrolment in a pool

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Pool membership (junction between a guild member and a Pool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMember {
    pub id: Snowflake,
    pub pool_id: Snowflake,
    pub member_id: Snowflake,
    pub user_id: Snowflake,
    pub active: bool,
    /// Member IDs this member refuses to be grouped with
    pub excluded_members: BTreeSet<Snowflake>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PoolMember {
    pub fn new(id: Snowflake, pool_id: Snowflake, member_id: Snowflake, user_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            pool_id,
            member_id,
            user_id,
            active: true,
            excluded_members: BTreeSet::new(),
            joined_at: now,
            updated_at: now,
        }
    }

    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = Snowflake>) -> Self {
        self.excluded_members = exclusions.into_iter().collect();
        self
    }

    /// One-sided check: did this member list `member_id`?
    #[inline]
    pub fn excludes(&self, member_id: Snowflake) -> bool {
        self.excluded_members.contains(&member_id)
    }

    /// Symmetric check: the pair is forbidden if either side listed the other
    #[inline]
    pub fn conflicts_with(&self, other: &PoolMember) -> bool {
        self.excludes(other.member_id) || other.excludes(self.member_id)
    }

    pub fn set_exclusions(&mut self, exclusions: BTreeSet<Snowflake>) {
        self.excluded_members = exclusions;
        self.updated_at = Utc::now();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }
}
