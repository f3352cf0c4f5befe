//! Business logic services
//!
//! Each service borrows or owns a [`ServiceContext`] and orchestrates the
//! domain model through the repository and provider ports.

pub mod context;
pub mod error;
pub mod lifecycle;
pub mod membership;
pub mod pool;
pub mod round;
pub mod scheduler;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use lifecycle::MatchLifecycleManager;
pub use membership::MembershipService;
pub use pool::PoolService;
pub use round::RoundQueryService;
pub use scheduler::{PoolLocks, RoundOutcome, RoundScheduler, RoundStatus, SchedulerOptions};
