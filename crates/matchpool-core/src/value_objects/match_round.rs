//! Round identifier - ISO-8601 week key (`YYYY-Www`)
//!
//! The textual form is persisted as part of the `(pool_id, match_round)`
//! uniqueness key, so it must stay byte-stable: four-digit ISO year, literal
//! `-W`, two-digit zero-padded ISO week.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO week a round belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchRound(String);

impl MatchRound {
    /// Round key for the ISO week containing `date`
    ///
    /// Late-December dates that belong to ISO week 1 report the following
    /// year, and early-January dates in week 52/53 report the previous one.
    pub fn from_date(date: DateTime<Utc>) -> Self {
        Self::from_naive_date(date.date_naive())
    }

    pub fn from_naive_date(date: NaiveDate) -> Self {
        let week = date.iso_week();
        Self(format!("{:04}-W{:02}", week.year(), week.week()))
    }

    /// Parse a stored round key, rejecting anything that is not a real ISO week
    pub fn parse(s: &str) -> Result<Self, MatchRoundParseError> {
        let invalid = || MatchRoundParseError(s.to_string());

        let (year, week) = s.split_once("-W").ok_or_else(invalid)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;

        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(invalid)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Monday of this ISO week
    pub fn starts_on(&self) -> Option<NaiveDate> {
        let (year, week) = self.0.split_once("-W")?;
        NaiveDate::from_isoywd_opt(year.parse().ok()?, week.parse().ok()?, Weekday::Mon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid match round: {0:?} (expected YYYY-Www)")]
pub struct MatchRoundParseError(pub String);

impl fmt::Display for MatchRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MatchRound {
    type Error = MatchRoundParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MatchRound> for String {
    fn from(round: MatchRound) -> Self {
        round.0
    }
}

impl std::str::FromStr for MatchRound {
    type Err = MatchRoundParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
