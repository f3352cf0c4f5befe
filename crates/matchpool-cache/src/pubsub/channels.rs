//! Pub/Sub channel definitions.
//!
//! Defines the channel naming conventions for Redis Pub/Sub.

use matchpool_core::Snowflake;

/// Channel prefix for pool events
pub const POOL_CHANNEL_PREFIX: &str = "pool:";
/// Channel prefix for guild-wide events
pub const GUILD_CHANNEL_PREFIX: &str = "guild:";

/// Pub/Sub channel types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for one matching pool
    Pool(Snowflake),
    /// Events for every pool of a guild
    Guild(Snowflake),
}

impl PubSubChannel {
    #[must_use]
    pub fn pool(pool_id: Snowflake) -> Self {
        Self::Pool(pool_id)
    }

    #[must_use]
    pub fn guild(guild_id: Snowflake) -> Self {
        Self::Guild(guild_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Pool(id) => format!("{POOL_CHANNEL_PREFIX}{id}"),
            Self::Guild(id) => format!("{GUILD_CHANNEL_PREFIX}{id}"),
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
