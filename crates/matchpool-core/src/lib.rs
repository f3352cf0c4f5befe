//! # matchpool-core
//!
//! Domain layer containing entities, value objects, the pairing engine,
//! repository/provider traits, and domain events.
//! This crate has zero dependencies on infrastructure (database, cache, runtime).

pub mod entities;
pub mod error;
pub mod events;
pub mod limits;
pub mod matching;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{MatchResult, MatchRoundInfo, MatchStatus, Pool, PoolMember};
pub use error::DomainError;
pub use events::DomainEvent;
pub use matching::{
    CompatibilityLookup, CompatibilityMatrix, HistoryLookup, MatchHistoryTracker, PairCounts,
    PairingEngine, RoundPlan,
};
pub use traits::{
    CompatibilityProvider, MatchResultRepository, MembershipProvider, NotificationDispatcher,
    PoolMemberRepository, PoolRepository, RepoResult, RoundCommit, RoundCommitted, RoundSummary,
};
pub use value_objects::{
    Frequency, MatchRound, MatchRoundParseError, MatchingConfig, MatchingConfigError, Snowflake, SnowflakeGenerator,
    SnowflakeParseError,
};
