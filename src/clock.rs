//! Wall-clock readings for a service day
//!
//! Activities are timed in hour:minute terms. `ClockTime` keeps the reading as
//! milliseconds from midnight of the service day, so a planned completion that
//! crosses midnight becomes `00:10+1` instead of wrapping back to `00:10` and
//! comparing as earlier than its own start.

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Accepted layouts for the time-of-day part, tried in order
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S%.f"];

/// A reading on the service-day clock, never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    millis: i64,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime { millis: 0 };

    /// Builds a same-day reading from hour and minute
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self::from_time)
    }

    /// Builds a same-day reading from a chrono time of day
    pub fn from_time(time: NaiveTime) -> Self {
        let millis = i64::from(time.num_seconds_from_midnight()) * MILLIS_PER_SECOND
            + i64::from(time.nanosecond() / 1_000_000).min(MILLIS_PER_SECOND - 1);
        ClockTime { millis }
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        (millis >= 0).then_some(ClockTime { millis })
    }

    /// Current local time, truncated to the minute
    pub fn now() -> Self {
        let now = Local::now().time();
        ClockTime {
            millis: i64::from(now.hour()) * MILLIS_PER_HOUR
                + i64::from(now.minute()) * MILLIS_PER_MINUTE,
        }
    }

    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    /// Whole days past the service day this reading falls on
    pub fn day_offset(&self) -> i64 {
        self.millis / MILLIS_PER_DAY
    }

    /// The time of day with the day offset stripped
    pub fn time_of_day(&self) -> NaiveTime {
        let within_day = self.millis % MILLIS_PER_DAY;
        let seconds = (within_day / MILLIS_PER_SECOND) as u32;
        let nanos = ((within_day % MILLIS_PER_SECOND) * 1_000_000) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos).unwrap_or(NaiveTime::MIN)
    }

    /// Advances the reading by a (possibly fractional) number of minutes.
    ///
    /// The result is rounded to the millisecond. Negative or non-finite
    /// minutes are rejected before they reach here; if one slips through the
    /// reading is clamped at midnight rather than going negative.
    pub fn add_minutes(self, minutes: f64) -> Self {
        let delta = (minutes * MILLIS_PER_MINUTE as f64).round() as i64;
        ClockTime {
            millis: self.millis.saturating_add(delta).max(0),
        }
    }

    /// Moves the reading forward by whole days
    pub fn plus_days(self, days: i64) -> Self {
        ClockTime {
            millis: self
                .millis
                .saturating_add(days.saturating_mul(MILLIS_PER_DAY))
                .max(0),
        }
    }

    /// Signed minutes from `earlier` to `self`
    pub fn minutes_since(&self, earlier: ClockTime) -> f64 {
        (self.millis - earlier.millis) as f64 / MILLIS_PER_MINUTE as f64
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let within_day = self.millis % MILLIS_PER_DAY;
        let hours = within_day / MILLIS_PER_HOUR;
        let minutes = (within_day / MILLIS_PER_MINUTE) % 60;
        let seconds = (within_day / MILLIS_PER_SECOND) % 60;
        let millis = within_day % MILLIS_PER_SECOND;

        write!(f, "{:02}:{:02}", hours, minutes)?;
        if seconds != 0 || millis != 0 {
            write!(f, ":{:02}", seconds)?;
            if millis != 0 {
                write!(f, ".{:03}", millis)?;
            }
        }
        if self.day_offset() > 0 {
            write!(f, "+{}", self.day_offset())?;
        }
        Ok(())
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidClockTime(s.to_string());
        let trimmed = s.trim();

        let (time_part, days) = match trimmed.split_once('+') {
            Some((time, days)) => (time, days.trim().parse::<u32>().map_err(|_| invalid())?),
            None => (trimmed, 0),
        };

        let time = TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(time_part.trim(), format).ok())
            .ok_or_else(invalid)?;

        Ok(ClockTime::from_time(time).plus_days(i64::from(days)))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}
