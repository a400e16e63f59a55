//! Date and date-time cutoffs for range queries
//!
//! Callers pass either an exact instant or a calendar date. A calendar date
//! covers the whole day: as a lower bound it starts at midnight, as an upper
//! bound it admits everything before the following midnight.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A bound on event timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cutoff {
    /// An exact instant, inclusive on both sides
    At(DateTime<Utc>),
    /// A calendar day (UTC), covering the full day
    Day(NaiveDate),
}

impl Cutoff {
    /// Earliest instant admitted when this cutoff is used as a lower bound
    pub fn lower_bound(&self) -> DateTime<Utc> {
        match self {
            Cutoff::At(t) => *t,
            Cutoff::Day(d) => midnight(*d),
        }
    }

    /// First instant past the cutoff's coverage.
    ///
    /// For a calendar day this is the following midnight; for an instant it is
    /// the instant itself. Used when a cutoff is stored as an expiration.
    pub fn end_instant(&self) -> DateTime<Utc> {
        match self {
            Cutoff::At(t) => *t,
            Cutoff::Day(d) => following_midnight(*d),
        }
    }

    /// Whether `ts` is admitted when this cutoff is used as a lower bound
    pub fn admits_from(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.lower_bound()
    }

    /// Whether `ts` is admitted when this cutoff is used as an upper bound
    pub fn admits_until(&self, ts: DateTime<Utc>) -> bool {
        match self {
            Cutoff::At(t) => ts <= *t,
            Cutoff::Day(d) => match d.succ_opt() {
                Some(next) => ts < midnight(next),
                None => true,
            },
        }
    }
}

/// Midnight UTC at the start of `day`
pub fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Midnight UTC after `day`, saturating at the end of the representable range
fn following_midnight(day: NaiveDate) -> DateTime<Utc> {
    day.succ_opt().map(midnight).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl From<DateTime<Utc>> for Cutoff {
    fn from(value: DateTime<Utc>) -> Self {
        Cutoff::At(value)
    }
}

impl From<NaiveDate> for Cutoff {
    fn from(value: NaiveDate) -> Self {
        Cutoff::Day(value)
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cutoff::At(t) => write!(f, "{}", t.to_rfc3339()),
            Cutoff::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for Cutoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(t) = DateTime::parse_from_rfc3339(s) {
            return Ok(Cutoff::At(t.with_timezone(&Utc)));
        }

        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Cutoff::At(Utc.from_utc_datetime(&naive)));
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Cutoff::Day)
            .map_err(|_| format!("Unrecognised date or date-time: {}", s))
    }
}

/// A time window built from two cutoffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Lower bound
    pub start: Cutoff,
    /// Upper bound
    pub end: Cutoff,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: impl Into<Cutoff>, end: impl Into<Cutoff>) -> Self {
        Self { start: start.into(), end: end.into() }
    }

    /// Whether `ts` lies inside the range
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.admits_from(ts) && self.end.admits_until(ts)
    }

    /// Whether the end bound falls before the start bound
    pub fn is_inverted(&self) -> bool {
        !self.end.admits_until(self.start.lower_bound())
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
