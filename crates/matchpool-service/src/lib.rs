//! # matchpool-service
//!
//! Application layer: pool administration, round scheduling, match lifecycle,
//! and the DTOs exchanged with whatever surface drives them.

pub mod dto;
pub mod services;

pub use services::{
    MatchLifecycleManager, MembershipService, PoolLocks, PoolService, RoundOutcome,
    RoundQueryService, RoundScheduler, RoundStatus, SchedulerOptions, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult,
};
