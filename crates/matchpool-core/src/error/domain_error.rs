//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::MatchStatus;
use crate::value_objects::{MatchRound, Snowflake};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Pool not found: {0}")]
    PoolNotFound(Snowflake),

    #[error("Member {member_id} is not enrolled in pool {pool_id}")]
    PoolMemberNotFound {
        pool_id: Snowflake,
        member_id: Snowflake,
    },

    #[error("Match not found: {0}")]
    MatchNotFound(Snowflake),

    #[error("No matches generated for pool {pool_id} in round {round}")]
    RoundNotFound { pool_id: Snowflake, round: MatchRound },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid match size {0}: must be between 2 and 6")]
    InvalidMatchSize(u8),

    #[error("Invalid frequency: {0:?}")]
    InvalidFrequency(String),

    #[error("Guild already has the maximum of {max} pools")]
    PoolLimitReached { max: usize },

    #[error("Pool already has the maximum of {max} active members")]
    MemberPoolLimitReached { max: usize },

    #[error("At most {max} exclusions are allowed per member")]
    ExclusionLimitReached { max: usize },

    // =========================================================================
    // Capacity Errors
    // =========================================================================
    #[error("Not enough active members: need {required}, have {available}")]
    NotEnoughMembers { required: usize, available: usize },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a member of this pool")]
    AlreadyMember,

    #[error("Round {round} already generated for pool {pool_id}")]
    RoundAlreadyGenerated { pool_id: Snowflake, round: MatchRound },

    // =========================================================================
    // State Errors
    // =========================================================================
    #[error("Cannot transition match from {from} to {to}")]
    CannotTransition { from: MatchStatus, to: MatchStatus },

    #[error("Member {0} is not part of this match")]
    NotMatchParticipant(Snowflake),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::PoolNotFound(_) => "UNKNOWN_POOL",
            Self::PoolMemberNotFound { .. } => "UNKNOWN_POOL_MEMBER",
            Self::MatchNotFound(_) => "UNKNOWN_MATCH",
            Self::RoundNotFound { .. } => "UNKNOWN_ROUND",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidMatchSize(_) => "INVALID_MATCH_SIZE",
            Self::InvalidFrequency(_) => "INVALID_FREQUENCY",
            Self::PoolLimitReached { .. } => "POOL_LIMIT_REACHED",
            Self::MemberPoolLimitReached { .. } => "MEMBER_POOL_LIMIT_REACHED",
            Self::ExclusionLimitReached { .. } => "EXCLUSION_LIMIT_REACHED",

            // Capacity
            Self::NotEnoughMembers { .. } => "NOT_ENOUGH_MEMBERS",

            // Conflict
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::RoundAlreadyGenerated { .. } => "ROUND_ALREADY_GENERATED",

            // State
            Self::CannotTransition { .. } => "CANNOT_TRANSITION",
            Self::NotMatchParticipant(_) => "NOT_MATCH_PARTICIPANT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PoolNotFound(_)
                | Self::PoolMemberNotFound { .. }
                | Self::MatchNotFound(_)
                | Self::RoundNotFound { .. }
        )
    }

    /// Check if this is a validation error (rejected at admin-mutation time)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidMatchSize(_)
                | Self::InvalidFrequency(_)
                | Self::PoolLimitReached { .. }
                | Self::MemberPoolLimitReached { .. }
                | Self::ExclusionLimitReached { .. }
        )
    }

    /// Check if this is a capacity error (a normal per-pool scheduler outcome)
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::NotEnoughMembers { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyMember | Self::RoundAlreadyGenerated { .. })
    }

    /// Check if this is a lifecycle state error
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            Self::CannotTransition { .. } | Self::NotMatchParticipant(_)
        )
    }
}
