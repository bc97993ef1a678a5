// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Datapoints and the clock that timestamps them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// A single `(timestamp, value)` observation.
///
/// The value is kept in its string form, which is what the service stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataPoint {
    #[serde(serialize_with = "serialize_timestamp")]
    at: DateTime<Utc>,
    value: String,
}

impl DataPoint {
    /// Create a point from any displayable value.
    pub fn new(at: DateTime<Utc>, value: impl ToString) -> Self {
        Self {
            at,
            value: value.to_string(),
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(at))
}

/// Source of "now" for points added without an explicit timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_point_stringifies_value() {
        let at = Utc.with_ymd_and_hms(2012, 10, 22, 11, 33, 0).unwrap();
        assert_eq!(DataPoint::new(at, 3.456).value(), "3.456");
        assert_eq!(DataPoint::new(at, 42).value(), "42");
        assert_eq!(DataPoint::new(at, true).value(), "true");
        assert_eq!(DataPoint::new(at, "on").value(), "on");
    }

    #[test]
    fn test_point_serializes_iso_timestamp() {
        let at = Utc.with_ymd_and_hms(2012, 10, 22, 11, 33, 0).unwrap();
        let json = serde_json::to_value(DataPoint::new(at, 1.234)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"at": "2012-10-22T11:33:00.000Z", "value": "1.234"})
        );
    }

    #[test]
    fn test_fixed_clock() {
        let at = Utc.with_ymd_and_hms(2012, 10, 23, 9, 27, 51).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }
}
