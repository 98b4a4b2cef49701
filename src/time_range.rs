use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Symbolic aggregation window accepted by the stats endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "8h")]
    EightHours,
    #[serde(rename = "24h")]
    Day,
    #[default]
    #[serde(rename = "1w")]
    Week,
    #[serde(rename = "1m")]
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::TwoHours,
        TimeRange::EightHours,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::TwoHours => "2h",
            TimeRange::EightHours => "8h",
            TimeRange::Day => "24h",
            TimeRange::Week => "1w",
            TimeRange::Month => "1m",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }

    /// Parse a request parameter; missing or unrecognized values mean one week
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => Self::default(),
            Some(raw) => Self::parse(raw).unwrap_or_else(|| {
                debug!("Unrecognized timeRange '{}', using {}", raw, Self::default());
                Self::default()
            }),
        }
    }

    /// Oldest instant included in the window ending at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::TwoHours => now - Duration::hours(2),
            TimeRange::EightHours => now - Duration::hours(8),
            TimeRange::Day => now - Duration::hours(24),
            TimeRange::Week => now - Duration::weeks(1),
            // Calendar month; falls back to 30 days if the date is unrepresentable
            TimeRange::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hours of history covered by an hourly series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HourWindow(u32);

impl HourWindow {
    pub const ALLOWED: [u32; 4] = [6, 12, 24, 48];

    pub fn new(hours: u32) -> Option<Self> {
        Self::ALLOWED.contains(&hours).then_some(Self(hours))
    }

    /// Parse a request parameter; anything outside the allowed set means 24
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => Self::default(),
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(Self::new)
                .unwrap_or_else(|| {
                    debug!("Unsupported hours '{}', using {}", raw, Self::default().0);
                    Self::default()
                }),
        }
    }

    pub fn hours(&self) -> u32 {
        self.0
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(i64::from(self.0))
    }
}

impl Default for HourWindow {
    fn default() -> Self {
        Self(24)
    }
}
