//! Anchoring calendar dates and times-of-day to absolute instants.
//!
//! Feeds disagree on how they express time: the class feed only carries a
//! time-of-day, the booking feeds carry full timestamps that may or may not
//! include an offset. Everything is resolved against a [`DayAnchor`], the query
//! date in the campus timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

const TIME_OF_DAY_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M%p", "%I:%M %p"];
const LOCAL_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse a time-of-day in 24-hour (`14:30`) or 12-hour (`02:30PM`) form.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| EngineError::InvalidTime(format!("'{}' is not a time of day", s)))
}

/// Parse an IANA timezone name.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone(s.to_string()))
}

/// Clamp a time-of-day into `[earliest, latest]`.
pub fn snap_time(time: NaiveTime, earliest: NaiveTime, latest: NaiveTime) -> NaiveTime {
    if time < earliest {
        earliest
    } else if time > latest {
        latest
    } else {
        time
    }
}

/// The query date pinned to the campus timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayAnchor {
    pub date: NaiveDate,
    pub tz: Tz,
}

impl DayAnchor {
    pub fn new(date: NaiveDate, tz: Tz) -> Self {
        Self { date, tz }
    }

    /// The instant at which the given wall-clock time occurs on the anchor date.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
    /// do not exist (DST spring-forward gap) are an error.
    pub fn at(&self, time: NaiveTime) -> Result<DateTime<Utc>> {
        localize(self.date.and_time(time), self.tz)
    }

    /// Combine a feed time-of-day string with the anchor date.
    pub fn time_of_day(&self, s: &str) -> Result<DateTime<Utc>> {
        self.at(parse_time_of_day(s)?)
    }

    /// Parse an absolute timestamp against the anchor's timezone.
    pub fn timestamp(&self, s: &str) -> Result<DateTime<Utc>> {
        parse_timestamp(s, self.tz)
    }
}

/// Parse an absolute timestamp. RFC 3339 values keep their own offset;
/// offset-less values are read as wall-clock time in `tz`.
pub fn parse_timestamp(s: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = LOCAL_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| EngineError::InvalidTime(format!("'{}' is not a timestamp", s)))?;
    localize(naive, tz)
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| EngineError::InvalidTime(format!("{} does not exist in {}", naive, tz)))
}

/// Truncate an instant to the start of its minute.
pub fn floor_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(t)
}

/// `HH:MM` (de)serialization for times-of-day.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`hhmm`].
pub(crate) mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_time_of_day(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
