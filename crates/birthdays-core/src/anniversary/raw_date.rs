//! Raw anniversary dates as supplied by the contact source.
//!
//! Two text forms are accepted: `YYYY-MM-DD` when the year is known and
//! `--MM-DD` when it is not.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// How Feb 29 is projected onto a year without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeapDayPolicy {
    /// Feb 29 falls on Feb 28.
    #[default]
    Clamp,
    /// Feb 29 falls on Mar 1.
    Roll,
}

/// A month/day pair with no year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Validated against a leap year, so `2-29` is accepted.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| Self { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_leap_day(&self) -> bool {
        self.month == 2 && self.day == 29
    }

    /// Place this month/day in `year`, applying `policy` to Feb 29.
    pub fn at_year(&self, year: i32, policy: LeapDayPolicy) -> Option<NaiveDate> {
        if let Some(date) = NaiveDate::from_ymd_opt(year, self.month, self.day) {
            return Some(date);
        }
        if !self.is_leap_day() {
            return None;
        }
        match policy {
            LeapDayPolicy::Clamp => NaiveDate::from_ymd_opt(year, 2, 28),
            LeapDayPolicy::Roll => NaiveDate::from_ymd_opt(year, 3, 1),
        }
    }
}

impl From<NaiveDate> for MonthDay {
    fn from(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{:02}-{:02}", self.month, self.day)
    }
}

/// An anniversary date, with or without its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawDate {
    Full(NaiveDate),
    MonthDay(MonthDay),
}

impl RawDate {
    pub fn month_day(&self) -> MonthDay {
        match self {
            RawDate::Full(date) => MonthDay::from(*date),
            RawDate::MonthDay(md) => *md,
        }
    }

    /// Year of the original event, when known.
    pub fn year(&self) -> Option<i32> {
        match self {
            RawDate::Full(date) => Some(date.year()),
            RawDate::MonthDay(_) => None,
        }
    }
}

impl FromStr for RawDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if let Some(rest) = input.strip_prefix("--") {
            return parse_month_day(rest)
                .map(RawDate::MonthDay)
                .ok_or_else(|| CoreError::malformed(input, "expected --MM-DD"));
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(RawDate::Full)
            .map_err(|e| CoreError::malformed(input, e.to_string()))
    }
}

fn parse_month_day(rest: &str) -> Option<MonthDay> {
    let (month, day) = rest.split_once('-')?;
    if month.len() != 2 || day.len() != 2 {
        return None;
    }
    MonthDay::new(month.parse().ok()?, day.parse().ok()?)
}

impl fmt::Display for RawDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawDate::Full(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            RawDate::MonthDay(md) => md.fmt(f),
        }
    }
}

impl Serialize for RawDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RawDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
