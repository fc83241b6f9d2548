//! Feed timestamps and the derived "time left" value.
//!
//! Both tracker feeds report local wall-clock times as `YYYYMMDD HH:MM:SS`
//! (rail) or `YYYYMMDD HH:MM` (bus). They carry no zone, so they are kept as
//! `NaiveDateTime` and only ever compared with each other.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid feed timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {value:?}: expected YYYYMMDD HH:MM[:SS]")]
pub struct TimeError {
    value: String,
}

/// Parse a tracker timestamp, with or without seconds.
///
/// # Examples
///
/// ```
/// use transit_aggregator::domain::parse_feed_timestamp;
///
/// let t = parse_feed_timestamp("20110618 23:26:12").unwrap();
/// assert_eq!(t.to_string(), "2011-06-18 23:26:12");
///
/// let t = parse_feed_timestamp("20130620 15:45").unwrap();
/// assert_eq!(t.to_string(), "2013-06-20 15:45:00");
///
/// assert!(parse_feed_timestamp("2013-06-20 15:45").is_err());
/// ```
pub fn parse_feed_timestamp(s: &str) -> Result<NaiveDateTime, TimeError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y%m%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y%m%d %H:%M"))
        .map_err(|_| TimeError {
            value: s.to_string(),
        })
}

/// Whole minutes between prediction and expected arrival, floored.
///
/// Flooring (rather than truncating toward zero) keeps a train that is
/// 30 seconds overdue at `-1` rather than `0`.
pub fn minutes_between(prediction: NaiveDateTime, expected: NaiveDateTime) -> i64 {
    let delta: TimeDelta = expected - prediction;
    delta.num_seconds().div_euclid(60)
}

/// What the rider sees in the "time left" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeLeft {
    /// A plain countdown.
    Minutes(i64),
    /// The train is approaching the platform.
    Due,
    /// The vehicle is flagged as delayed.
    Delayed,
}

impl TimeLeft {
    /// Derive the display value from the timestamps and status flags.
    ///
    /// Delay takes precedence over approach: a delayed train that is also
    /// approaching still shows "Delay".
    pub fn derive(
        prediction: NaiveDateTime,
        expected: NaiveDateTime,
        is_approaching: bool,
        is_delayed: bool,
    ) -> Self {
        if is_delayed {
            TimeLeft::Delayed
        } else if is_approaching {
            TimeLeft::Due
        } else {
            TimeLeft::Minutes(minutes_between(prediction, expected))
        }
    }

    /// Short label for display.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLeft::Minutes(m) => write!(f, "{m} min"),
            TimeLeft::Due => f.write_str("Due"),
            TimeLeft::Delayed => f.write_str("Delay"),
        }
    }
}

impl Serialize for TimeLeft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
