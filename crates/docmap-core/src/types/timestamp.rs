use crate::types::{Date, TimeParseError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const NANOS_PER_MILLI: i64 = 1_000_000;

///
/// Timestamp
/// (in nanoseconds since the unix epoch)
///
/// Higher-precision instant. Fields declared as timestamps are promoted from
/// the store's millisecond `Date` on read and truncated back on write.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    #[must_use]
    pub const fn from_nanos(ns: i64) -> Self {
        Self(ns)
    }

    /// Construct from milliseconds, saturating at the representable range.
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms.saturating_mul(NANOS_PER_MILLI))
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    #[must_use]
    /// Sub-millisecond part is discarded.
    pub const fn to_date(self) -> Date {
        Date::from_millis(self.0.div_euclid(NANOS_PER_MILLI))
    }

    pub fn now() -> Result<Self, TimeParseError> {
        let now = Utc::now();
        now.timestamp_nanos_opt()
            .map(Self)
            .ok_or_else(|| TimeParseError::OutOfRange(now.to_rfc3339()))
    }

    pub fn parse_rfc3339(s: &str) -> Result<Self, TimeParseError> {
        let dt =
            DateTime::parse_from_rfc3339(s).map_err(|e| TimeParseError::Parse(e.to_string()))?;

        dt.timestamp_nanos_opt()
            .map(Self)
            .ok_or_else(|| TimeParseError::OutOfRange(s.to_string()))
    }

    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

impl From<Date> for Timestamp {
    fn from(date: Date) -> Self {
        Self::from_millis(date.get())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.to_datetime()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true)
        )
    }
}

///
/// TESTS
///
