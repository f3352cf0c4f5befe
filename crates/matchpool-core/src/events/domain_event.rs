//! Domain events - events emitted when match state changes
//!
//! Serialized as the payload handed to notification transports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{MatchResult, MatchStatus, Pool};
use crate::value_objects::{MatchRound, Snowflake};

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    MatchCreated(MatchCreatedEvent),
    MatchStatusChanged(MatchStatusChangedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MatchCreated(_) => "MATCH_CREATED",
            Self::MatchStatusChanged(_) => "MATCH_STATUS_CHANGED",
        }
    }

    pub fn pool_id(&self) -> Snowflake {
        match self {
            Self::MatchCreated(e) => e.pool_id,
            Self::MatchStatusChanged(e) => e.pool_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MatchCreated(e) => e.timestamp,
            Self::MatchStatusChanged(e) => e.timestamp,
        }
    }

    pub fn match_created(pool: &Pool, result: &MatchResult) -> Self {
        Self::MatchCreated(MatchCreatedEvent {
            match_id: result.id,
            pool_id: pool.id,
            guild_id: pool.guild_id,
            match_round: result.match_round.clone(),
            members: result.members.clone(),
            timestamp: result.created_at,
        })
    }

    pub fn status_changed(result: &MatchResult, previous: MatchStatus) -> Self {
        Self::MatchStatusChanged(MatchStatusChangedEvent {
            match_id: result.id,
            pool_id: result.pool_id,
            previous,
            status: result.status,
            scheduled_time: result.scheduled_time,
            timestamp: result.updated_at,
        })
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCreatedEvent {
    pub match_id: Snowflake,
    pub pool_id: Snowflake,
    pub guild_id: Snowflake,
    pub match_round: MatchRound,
    pub members: Vec<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStatusChangedEvent {
    pub match_id: Snowflake,
    pub pool_id: Snowflake,
    pub previous: MatchStatus,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}
