//! Domain entities - core business objects

mod match_result;
mod pool;
mod pool_member;

pub use match_result::{MatchResult, MatchRoundInfo, MatchStatus};
pub use pool::Pool;
pub use pool_member::PoolMember;
