//! NotificationDispatcher backed by Redis Pub/Sub

use async_trait::async_trait;
use tracing::instrument;

use matchpool_core::entities::{MatchResult, MatchStatus, Pool};
use matchpool_core::error::DomainError;
use matchpool_core::events::DomainEvent;
use matchpool_core::traits::{NotificationDispatcher, RepoResult};

use crate::pool::RedisPoolError;
use crate::pubsub::{EventTarget, PubSubChannel, PubSubEvent, Publisher};

fn cache_error(e: RedisPoolError) -> DomainError {
    DomainError::CacheError(e.to_string())
}

/// Publishes match events to `pool:{id}` (and `guild:{id}` for new matches)
#[derive(Clone)]
pub struct RedisNotificationDispatcher {
    publisher: Publisher,
}

impl RedisNotificationDispatcher {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl NotificationDispatcher for RedisNotificationDispatcher {
    #[instrument(skip(self, pool, result), fields(pool_id = %pool.id, match_id = %result.id))]
    async fn notify_match_created(&self, pool: &Pool, result: &MatchResult) -> RepoResult<()> {
        let event = PubSubEvent::from_domain(&DomainEvent::match_created(pool, result))
            .map_err(|e| cache_error(e.into()))?
            .with_target(
                EventTarget::pool(pool.id)
                    .with_guild(pool.guild_id)
                    .with_members(&result.members),
            );

        let channels = [PubSubChannel::pool(pool.id), PubSubChannel::guild(pool.guild_id)];
        self.publisher
            .publish_many(&channels, &event)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    #[instrument(skip(self, result), fields(match_id = %result.id, status = %result.status))]
    async fn notify_status_changed(
        &self,
        result: &MatchResult,
        previous: MatchStatus,
    ) -> RepoResult<()> {
        let event = PubSubEvent::from_domain(&DomainEvent::status_changed(result, previous))
            .map_err(|e| cache_error(e.into()))?
            .with_target(EventTarget::pool(result.pool_id).with_members(&result.members));

        self.publisher
            .publish(&PubSubChannel::pool(result.pool_id), &event)
            .await
            .map_err(cache_error)?;

        Ok(())
    }
}
