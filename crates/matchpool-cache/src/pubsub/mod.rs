//! Redis Pub/Sub module.
//!
//! Provides publish functionality for match event distribution.

mod channels;
mod publisher;

pub use channels::{PubSubChannel, GUILD_CHANNEL_PREFIX, POOL_CHANNEL_PREFIX};
pub use publisher::{EventTarget, PubSubEvent, Publisher};
