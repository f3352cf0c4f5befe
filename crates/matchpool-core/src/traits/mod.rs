//! Ports implemented by infrastructure crates

mod providers;
mod repositories;

pub use providers::{CompatibilityProvider, MembershipProvider, NotificationDispatcher};
pub use repositories::{
    MatchResultRepository, PoolMemberRepository, PoolRepository, RepoResult, RoundCommit,
    RoundCommitted, RoundSummary,
};
