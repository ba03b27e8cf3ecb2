//! Next-occurrence resolution for annual dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::raw_date::{LeapDayPolicy, RawDate};
use crate::error::{CoreError, Result};

/// Facts derived from a raw date relative to one "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The next date the anniversary falls on, today included.
    pub occurrence: NaiveDate,
    pub days_until: u32,
    /// Age reached on `occurrence`; only known when the raw date had a year.
    pub next_age: Option<i32>,
}

/// Resolves raw dates to their next occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnniversaryResolver {
    leap_day_policy: LeapDayPolicy,
}

impl AnniversaryResolver {
    pub fn new(leap_day_policy: LeapDayPolicy) -> Self {
        Self { leap_day_policy }
    }

    /// Resolve `raw` against `today`.
    ///
    /// An occurrence falling on `today` is kept (`days_until == 0`); one
    /// already past this year moves to the following year.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedDate`] when the month/day cannot be
    /// placed in the candidate year.
    pub fn resolve(&self, raw: &RawDate, today: NaiveDate) -> Result<Resolution> {
        let month_day = raw.month_day();
        let project = |year: i32| {
            month_day
                .at_year(year, self.leap_day_policy)
                .ok_or_else(|| CoreError::malformed(raw.to_string(), format!("no such day in {year}")))
        };

        let mut occurrence = project(today.year())?;
        if occurrence < today {
            occurrence = project(today.year() + 1)?;
        }

        let days_until = u32::try_from((occurrence - today).num_days())
            .map_err(|_| CoreError::malformed(raw.to_string(), "occurrence before today"))?;
        let next_age = raw.year().map(|born| occurrence.year() - born);

        Ok(Resolution {
            occurrence,
            days_until,
            next_age,
        })
    }
}
