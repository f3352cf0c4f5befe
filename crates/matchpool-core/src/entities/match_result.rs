//! MatchResult entity - one group produced for a pool round

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::{MatchRound, Snowflake};

/// Lifecycle status of a produced match
///
/// ```text
/// pending ──► scheduled ──► completed
///    │            │ ▲
///    │            └─┘ (reschedule)
///    ├────────────┴───────► skipped
///    └────────────────────► completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Pending,
    Scheduled,
    Completed,
    Skipped,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    /// Whether a match in this status may move to `next`
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        match self {
            Self::Pending => next != Self::Pending,
            Self::Scheduled => next != Self::Pending,
            Self::Completed | Self::Skipped => false,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A produced group for one round. Membership never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub id: Snowflake,
    pub pool_id: Snowflake,
    /// Member IDs, ascending
    pub members: Vec<Snowflake>,
    pub status: MatchStatus,
    pub match_round: MatchRound,
    pub scheduled_event: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchResult {
    /// Create a pending match; members are stored sorted and de-duplicated
    pub fn new(
        id: Snowflake,
        pool_id: Snowflake,
        match_round: MatchRound,
        mut members: Vec<Snowflake>,
        created_at: DateTime<Utc>,
    ) -> Self {
        members.sort_unstable();
        members.dedup();
        Self {
            id,
            pool_id,
            members,
            status: MatchStatus::Pending,
            match_round,
            scheduled_event: None,
            scheduled_time: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[inline]
    pub fn includes(&self, member_id: Snowflake) -> bool {
        self.members.binary_search(&member_id).is_ok()
    }

    /// Apply a status change, rejecting any move out of a terminal state
    pub fn transition(&mut self, next: MatchStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::CannotTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Attach a meeting time (pending -> scheduled, or reschedule)
    pub fn schedule(
        &mut self,
        at: DateTime<Utc>,
        event: Option<String>,
    ) -> Result<(), DomainError> {
        self.transition(MatchStatus::Scheduled)?;
        self.scheduled_time = Some(at);
        self.scheduled_event = event;
        Ok(())
    }
}

/// Everything produced for one pool round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRoundInfo {
    pub round: MatchRound,
    /// Creation time of the round's matches
    pub ran_on: DateTime<Utc>,
    pub matches: Vec<MatchResult>,
}
