//! MatchResult entity <-> model mapper

use matchpool_core::entities::{MatchResult, MatchStatus};
use matchpool_core::error::DomainError;
use matchpool_core::value_objects::{MatchRound, Snowflake};

use crate::models::MatchResultModel;

/// Convert MatchResultModel to MatchResult entity
///
/// Fails on a malformed round key or status; both are CHECK-constrained in the schema.
impl TryFrom<MatchResultModel> for MatchResult {
    type Error = DomainError;

    fn try_from(model: MatchResultModel) -> Result<Self, Self::Error> {
        let match_round = MatchRound::parse(&model.match_round)
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        let status = MatchStatus::parse(&model.status).ok_or_else(|| {
            DomainError::DatabaseError(format!("unknown match status {:?}", model.status))
        })?;

        Ok(MatchResult {
            id: Snowflake::new(model.id),
            pool_id: Snowflake::new(model.pool_id),
            members: model.members.into_iter().map(Snowflake::new).collect(),
            status,
            match_round,
            scheduled_event: model.scheduled_event,
            scheduled_time: model.scheduled_time,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first bad one
pub(crate) fn results_from_models(models: Vec<MatchResultModel>) -> Result<Vec<MatchResult>, DomainError> {
    models.into_iter().map(MatchResult::try_from).collect()
}

/// Convert MatchResult entity reference to values for database insertion
pub struct MatchResultInsert<'a> {
    pub id: i64,
    pub pool_id: i64,
    pub match_round: &'a str,
    pub members: Vec<i64>,
    pub status: &'static str,
}

impl<'a> MatchResultInsert<'a> {
    pub fn new(result: &'a MatchResult) -> Self {
        Self {
            id: result.id.into_inner(),
            pool_id: result.pool_id.into_inner(),
            match_round: result.match_round.as_str(),
            members: result.members.iter().map(|id| id.into_inner()).collect(),
            status: result.status.as_str(),
        }
    }
}
