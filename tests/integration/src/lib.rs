//! Integration test utilities
//!
//! In-memory adapters for every port plus a harness that wires them into the
//! service layer, so scheduler and lifecycle behavior can be exercised
//! end-to-end without Postgres or Redis.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
