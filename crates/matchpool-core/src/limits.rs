//! Hard limits enforced at admin-mutation time

pub const MIN_MATCH_SIZE: u8 = 2;
pub const MAX_MATCH_SIZE: u8 = 6;

pub const MAX_POOLS_PER_GUILD: usize = 10;
pub const MAX_MEMBERS_PER_POOL: usize = 100;
pub const MAX_EXCLUSIONS_PER_MEMBER: usize = 20;

pub const DEFAULT_RECENCY_DAYS: u32 = 30;

/// Score assumed when the compatibility provider has no answer for a pair
pub const NEUTRAL_COMPATIBILITY: f64 = 50.0;

#[inline]
pub fn is_valid_match_size(size: u8) -> bool {
    (MIN_MATCH_SIZE..=MAX_MATCH_SIZE).contains(&size)
}
