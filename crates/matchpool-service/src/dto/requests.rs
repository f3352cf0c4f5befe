//! Request DTOs for the admin and member surfaces
//!
//! Shape checks live on the DTOs via `Validate`; pool and membership limits
//! are enforced by the services so they surface as domain errors.

use chrono::{DateTime, Utc};
use matchpool_core::Snowflake;
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Pool Requests
// ============================================================================

/// Create pool request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePoolRequest {
    /// weekly, biweekly, or monthly
    #[validate(length(min = 1, max = 16, message = "Frequency must be 1-16 characters"))]
    pub frequency: String,

    pub match_size: u8,

    /// First round; defaults to one cadence from now
    pub next_match_on: Option<DateTime<Utc>>,
}

/// Update pool request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePoolRequest {
    #[validate(length(min = 1, max = 16, message = "Frequency must be 1-16 characters"))]
    pub frequency: Option<String>,

    pub match_size: Option<u8>,

    pub active: Option<bool>,

    pub next_match_on: Option<DateTime<Utc>>,
}

// ============================================================================
// Membership Requests
// ============================================================================

/// Join pool request
#[derive(Debug, Clone, Deserialize)]
pub struct JoinPoolRequest {
    /// Account the compatibility provider knows this member by
    pub user_id: Snowflake,

    #[serde(default)]
    pub excluded_members: Vec<Snowflake>,
}

/// Update membership request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMembershipRequest {
    pub active: Option<bool>,

    /// Replaces the whole exclusion set
    pub excluded_members: Option<Vec<Snowflake>>,
}

// ============================================================================
// Match Requests
// ============================================================================

/// Attach a meeting time to a match
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleMatchRequest {
    pub scheduled_time: DateTime<Utc>,

    #[validate(length(min = 1, max = 200, message = "Event must be 1-200 characters"))]
    pub scheduled_event: Option<String>,
}
