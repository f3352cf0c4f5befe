//! Data transfer objects
//!
//! - Request DTOs with validation for admin and member inputs
//! - Response DTOs for serialized outputs
//! - Mappers from domain entities to responses

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreatePoolRequest, JoinPoolRequest, ScheduleMatchRequest, UpdateMembershipRequest,
    UpdatePoolRequest,
};

pub use responses::{
    MatchResponse, MatchRoundInfoResponse, PoolMemberResponse, PoolResponse, RoundSummaryResponse,
};
