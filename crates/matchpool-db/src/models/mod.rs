//! Database models - SQLx-compatible structs for PostgreSQL tables

mod match_result;
mod pool;
mod pool_member;

pub use match_result::{MatchResultModel, RoundSummaryModel};
pub use pool::PoolModel;
pub use pool_member::PoolMemberModel;
