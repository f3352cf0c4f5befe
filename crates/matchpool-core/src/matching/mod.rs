//! Pairing algorithm and its inputs

mod engine;
mod history;
mod lookup;

pub use engine::{PairingEngine, RoundPlan};
pub use history::MatchHistoryTracker;
pub use lookup::{pair_key, CompatibilityLookup, CompatibilityMatrix, HistoryLookup, PairCounts};
