//! # matchpool-cache
//!
//! Redis pub/sub layer for match notifications.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Match events published per pool and per guild
//! - **Notifier**: `NotificationDispatcher` implementation used by the scheduler
//!
//! ## Example
//!
//! ```ignore
//! use matchpool_cache::{Publisher, RedisNotificationDispatcher, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let dispatcher = RedisNotificationDispatcher::new(Publisher::new(pool));
//!
//! dispatcher.notify_match_created(&pool_entity, &match_result).await?;
//! ```

pub mod notifier;
pub mod pool;
pub mod pubsub;

pub use notifier::RedisNotificationDispatcher;
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use pubsub::{
    EventTarget, PubSubChannel, PubSubEvent, Publisher, GUILD_CHANNEL_PREFIX, POOL_CHANNEL_PREFIX,
};
