//! Pool cadence

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a pool runs a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Strict parse used when admins configure a pool
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Lenient parse for stored values: anything unrecognised runs weekly
    pub fn parse_or_weekly(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// When the next round is due, counting from `from`
    ///
    /// Monthly adds one calendar month, clamping to the last day of shorter
    /// months (Jan 31 -> Feb 28/29).
    pub fn next_match_date(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Weekly => from + Duration::days(7),
            Self::Biweekly => from + Duration::days(14),
            Self::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or_else(|| from + Duration::days(30)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
