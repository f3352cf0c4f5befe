//! Value objects - immutable types that represent domain concepts

mod frequency;
mod match_round;
mod matching_config;
mod snowflake;

pub use frequency::Frequency;
pub use match_round::{MatchRound, MatchRoundParseError};
pub use matching_config::{MatchingConfig, MatchingConfigError};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
