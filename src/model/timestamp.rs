use chrono::Duration;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

pub fn now() -> Timestamp {
    chrono::Utc::now().into()
}

/// An instant in time, always carried in UTC.
///
/// Serializes as an RFC 3339 string so that stored values compare
/// chronologically under the database's plain string ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, new)]
pub struct Timestamp(chrono::DateTime<chrono::Utc>);

impl From<chrono::DateTime<chrono::Utc>> for Timestamp {
    fn from(instant: chrono::DateTime<chrono::Utc>) -> Self {
        Self(instant)
    }
}

impl std::ops::Deref for Timestamp {
    type Target = chrono::DateTime<chrono::Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_rfc3339().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        chrono::DateTime::parse_from_rfc3339(&s)
            .map(|dt| Self(dt.into()))
            .map_err(serde::de::Error::custom)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0 - rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(input: &str) -> Timestamp {
        input.parse::<chrono::DateTime<chrono::Utc>>().unwrap().into()
    }

    #[test]
    fn serializes_as_rfc3339() {
        let stamp = ts("2024-05-15T12:00:00Z");
        let json = serde_json::to_string(&stamp).unwrap();

        assert_eq!(json, "\"2024-05-15T12:00:00+00:00\"");
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), stamp);
    }

    #[test]
    fn difference_is_a_duration() {
        let earlier = ts("2024-05-15T12:00:00Z");
        let later = ts("2024-05-15T12:01:30Z");

        assert_eq!(later - earlier, Duration::seconds(90));
    }

    #[test]
    fn shifts_by_a_duration() {
        let stamp = ts("2024-05-15T12:00:00Z");

        assert_eq!(stamp + Duration::seconds(60), ts("2024-05-15T12:01:00Z"));
        assert_eq!(stamp - Duration::days(1), ts("2024-05-14T12:00:00Z"));
    }
}
