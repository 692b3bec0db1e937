//! Civil time helpers.
//!
//! Every date the reconciler deals with lives in one fixed civil timezone.
//! Arithmetic on timetable dates is done on local wall-clock values and only
//! turned back into instants at the edges, so weekly steps keep the period's
//! start time across daylight-saving changes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// Timezone used when no other is configured.
pub const DEFAULT_TIMEZONE: &str = "Europe/Vilnius";

/// The fixed civil timezone all timetable dates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilZone(Tz);

impl CivilZone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parse an IANA timezone identifier such as `Europe/Vilnius`.
    pub fn parse(name: &str) -> ScheduleResult<Self> {
        name.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|e| ScheduleError::invalid_timezone(format!("{}: {}", name, e)))
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Current instant expressed in the civil zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.0)
    }

    /// Wall-clock reading of an instant in the civil zone.
    pub fn to_local<Z: TimeZone>(&self, instant: &DateTime<Z>) -> NaiveDateTime {
        instant.with_timezone(&self.0).naive_local()
    }

    /// Turn a wall-clock reading back into an instant.
    ///
    /// Ambiguous readings (clock set back) resolve to the earlier instant;
    /// readings inside a spring-forward gap do not exist and are an error.
    pub fn localize(&self, local: NaiveDateTime) -> ScheduleResult<DateTime<Tz>> {
        self.0.from_local_datetime(&local).earliest().ok_or_else(|| {
            ScheduleError::time_parse(format!("{} does not exist in {}", local, self.name()))
        })
    }
}

impl Default for CivilZone {
    fn default() -> Self {
        Self(chrono_tz::Europe::Vilnius)
    }
}

impl FromStr for CivilZone {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CivilZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a period start time in `HH:MM` form.
pub fn parse_start_time(value: &str) -> ScheduleResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| ScheduleError::time_parse(format!("start time {:?}: {}", value, e)))
}

/// Five-character weekday flag string, Monday first (`"00100"` is Wednesday).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdayMask(String);

impl WeekdayMask {
    pub fn new(mask: impl Into<String>) -> Self {
        Self(mask.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The single weekday this mask flags, if it flags exactly one of Mon–Fri.
    pub fn weekday(&self) -> Option<Weekday> {
        match self.0.as_str() {
            "10000" => Some(Weekday::Mon),
            "01000" => Some(Weekday::Tue),
            "00100" => Some(Weekday::Wed),
            "00010" => Some(Weekday::Thu),
            "00001" => Some(Weekday::Fri),
            _ => None,
        }
    }
}

impl fmt::Display for WeekdayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
