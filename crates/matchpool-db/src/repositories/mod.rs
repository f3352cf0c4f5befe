//! Repository implementations
//!
//! PostgreSQL implementations of the repository and provider traits defined in
//! matchpool-core. Each repository handles database operations for one table.

mod compatibility;
mod error;
mod match_result;
mod pool;
mod pool_member;

pub use compatibility::PgCompatibilityProvider;
pub use match_result::PgMatchResultRepository;
pub use pool::PgPoolRepository;
pub use pool_member::PgPoolMemberRepository;
