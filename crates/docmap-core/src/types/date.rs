use crate::types::TimeParseError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Date
/// (in milliseconds since the unix epoch)
///
/// The store's native instant type. Millisecond precision is all the store
/// keeps; anything finer is truncated on write.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct Date(i64);

impl Date {
    pub const EPOCH: Self = Self(0);

    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    #[must_use]
    /// Current wall-clock instant.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn parse_rfc3339(s: &str) -> Result<Self, TimeParseError> {
        let dt =
            DateTime::parse_from_rfc3339(s).map_err(|e| TimeParseError::Parse(e.to_string()))?;

        Ok(Self(dt.timestamp_millis()))
    }

    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => write!(f, "{}ms", self.0),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_round_trips_at_millisecond_precision() {
        let date = Date::parse_rfc3339("2024-03-01T12:30:45.123Z").expect("valid date");

        assert_eq!(date.to_string(), "2024-03-01T12:30:45.123Z");
        assert_eq!(Date::parse_rfc3339(&date.to_string()).unwrap(), date);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Date::parse_rfc3339("yesterday").is_err());
    }
}
