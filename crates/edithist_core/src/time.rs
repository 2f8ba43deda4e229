//! Millisecond-epoch timestamps used as record keys and query cutoffs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A point in time, stored as signed milliseconds since the Unix epoch.
///
/// This is the exact unit the change log uses for record keys, so values
/// survive a load/write cycle without rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Earliest representable timestamp.
    pub const MIN: Timestamp = Timestamp(i64::MIN);
    /// Latest representable timestamp.
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Shift by a signed number of milliseconds, saturating at the bounds.
    pub fn offset_millis(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// Convert to a chrono datetime.
    ///
    /// # Returns
    /// `None` when the value is outside chrono's supported range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{} ({})", self.0, datetime.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Error returned when a timestamp string is neither an integer nor RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}': expected epoch milliseconds or an RFC 3339 datetime")]
pub struct ParseTimestampError(String);

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(millis) = trimmed.parse::<i64>() {
            return Ok(Self(millis));
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|datetime| Self(datetime.timestamp_millis()))
            .map_err(|_| ParseTimestampError(value.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

// Records written by older extension builds store times as numeric strings,
// and some store fractional milliseconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampRepr {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

fn truncate_millis(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TimestampRepr::deserialize(deserializer)? {
            TimestampRepr::Millis(millis) => Ok(Self(millis)),
            TimestampRepr::Fractional(value) => truncate_millis(value).map(Self).ok_or_else(|| {
                serde::de::Error::custom(format!("millisecond timestamp {} out of range", value))
            }),
            TimestampRepr::Text(text) => text.trim().parse::<i64>().map(Self).map_err(|_| {
                serde::de::Error::custom(format!("invalid millisecond timestamp '{}'", text))
            }),
        }
    }
}
