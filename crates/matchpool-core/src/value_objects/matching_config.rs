//! Pairing trade-off knobs

use serde::{Deserialize, Serialize};

use crate::limits::DEFAULT_RECENCY_DAYS;

/// Weights balancing pairing variety against predicted compatibility
///
/// Passed explicitly into every engine call; nothing reads a global default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Penalty weight for pairs grouped together within the recency window
    pub variety_weight: f64,
    /// Reward weight for the provider's 0-100 compatibility score
    pub compatibility_weight: f64,
    /// Trailing window, in days, over which repeat pairings are counted
    pub recency_days: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            variety_weight: 0.6,
            compatibility_weight: 0.4,
            recency_days: DEFAULT_RECENCY_DAYS,
        }
    }
}

impl MatchingConfig {
    /// Build a config, rejecting weights outside `[0, 1]` and an empty window
    pub fn new(
        variety_weight: f64,
        compatibility_weight: f64,
        recency_days: u32,
    ) -> Result<Self, MatchingConfigError> {
        let config = Self {
            variety_weight,
            compatibility_weight,
            recency_days,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchingConfigError> {
        check_weight("variety_weight", self.variety_weight)?;
        check_weight("compatibility_weight", self.compatibility_weight)?;
        if self.recency_days == 0 {
            return Err(MatchingConfigError::EmptyRecencyWindow);
        }
        Ok(())
    }
}

fn check_weight(field: &'static str, value: f64) -> Result<(), MatchingConfigError> {
    // NaN fails the range check
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MatchingConfigError::WeightOutOfRange { field, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MatchingConfigError {
    #[error("{field} must be within [0, 1], got {value}")]
    WeightOutOfRange { field: &'static str, value: f64 },

    #[error("recency_days must be at least 1")]
    EmptyRecencyWindow,
}
