use chrono::{Datelike as _, Months, NaiveDate, NaiveTime};
use snafu::Snafu;

use super::*;

const FORMAT: &str = "%Y-%m-%d";

/// A calendar day in UTC, the bucket key for daily view aggregation.
///
/// Serializes as a `YYYY-MM-DD` string, which also compares
/// chronologically under plain string ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NaiveDate);

impl Day {
    /// Midnight at the start of this day.
    pub fn start(self) -> Timestamp {
        self.0.and_time(NaiveTime::MIN).and_utc().into()
    }

    pub fn next(self) -> Day {
        Day(self.0 + chrono::Duration::days(1))
    }

    pub fn back(self, days: i64) -> Day {
        Day(self.0 - chrono::Duration::days(days))
    }

    /// The first day of this day's month.
    pub fn month_start(self) -> Day {
        self.0.with_day(1).map(Day).unwrap_or(self)
    }

    pub fn months_back(self, months: u32) -> Day {
        self.0
            .checked_sub_months(Months::new(months))
            .map(Day)
            .unwrap_or(self)
    }

    pub fn months_ahead(self, months: u32) -> Day {
        self.0
            .checked_add_months(Months::new(months))
            .map(Day)
            .unwrap_or(self)
    }

    /// The `YYYY-MM` label used by monthly rollups.
    pub fn month_label(self) -> String {
        self.0.format("%Y-%m").to_string()
    }
}

impl From<Timestamp> for Day {
    fn from(stamp: Timestamp) -> Self {
        Day(stamp.date_naive())
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl std::str::FromStr for Day {
    type Err = ParseDay;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(input, FORMAT)
            .map(Day)
            .map_err(|_| ParseDay::new(input.to_string()))
    }
}

impl Serialize for Day {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Snafu, new)]
#[snafu(display("Failed to parse day: {}", text))]
pub struct ParseDay {
    pub text: String,
}
