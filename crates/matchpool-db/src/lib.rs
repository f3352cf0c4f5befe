//! # matchpool-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository and
//! provider traits defined in `matchpool-core`. It handles:
//!
//! - Connection pool management and schema setup
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including the all-or-nothing round commit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use matchpool_db::pool::{apply_schema, create_pool, DatabaseConfig};
//! use matchpool_db::repositories::PgPoolRepository;
//! use matchpool_core::traits::PoolRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     apply_schema(&pool).await?;
//!     let pools = PgPoolRepository::new(pool);
//!
//!     let due = pools.find_due(chrono::Utc::now()).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{apply_schema, create_pool, DatabaseConfig, PgPool};
pub use repositories::{
    PgCompatibilityProvider, PgMatchResultRepository, PgPoolMemberRepository, PgPoolRepository,
};
