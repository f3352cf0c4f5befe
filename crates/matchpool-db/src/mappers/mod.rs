//! Entity to model mappers
//!
//! This module provides conversions between domain entities (matchpool-core) and database models.
//! - `From<Model> for Entity` where every stored value maps cleanly
//! - `TryFrom<Model> for Entity` where a stored string must parse
//! - `*Insert` structs: Prepare entity data for database operations

mod match_result;
mod pool;
mod pool_member;

pub use match_result::MatchResultInsert;
pub(crate) use match_result::results_from_models;
pub use pool::PoolInsert;
pub use pool_member::{exclusions_to_db, PoolMemberInsert};
