//! Pool entity - a guild-scoped rotating matching program

use chrono::{DateTime, Utc};

use crate::value_objects::{Frequency, Snowflake};

/// Matching pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub frequency: Frequency,
    pub match_size: u8,
    pub active: bool,
    pub next_match_on: DateTime<Utc>,
    pub last_match_on: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pool {
    /// Create an active pool whose first round is due at `next_match_on`
    pub fn new(
        id: Snowflake,
        guild_id: Snowflake,
        frequency: Frequency,
        match_size: u8,
        next_match_on: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            guild_id,
            frequency,
            match_size,
            active: true,
            next_match_on,
            last_match_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the scheduler should run a round for this pool at `now`
    #[inline]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.active && self.next_match_on <= now
    }

    /// Record a round run at `now` and push the next one out by one cadence
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.last_match_on = Some(now);
        self.next_match_on = self.frequency.next_match_date(now);
        self.updated_at = now;
    }

    pub fn set_frequency(&mut self, frequency: Frequency) {
        self.frequency = frequency;
        self.updated_at = Utc::now();
    }

    pub fn set_match_size(&mut self, match_size: u8) {
        self.match_size = match_size;
        self.updated_at = Utc::now();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }

    pub fn reschedule(&mut self, next_match_on: DateTime<Utc>) {
        self.next_match_on = next_match_on;
        self.updated_at = Utc::now();
    }
}
