//! # matchpool-scheduler
//!
//! Daemon wiring the Postgres and Redis adapters into a [`RoundScheduler`]
//! and running it on a fixed tick.
//!
//! [`RoundScheduler`]: matchpool_service::RoundScheduler

pub mod server;
pub mod state;
