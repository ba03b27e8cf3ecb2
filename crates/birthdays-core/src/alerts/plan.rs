//! Alert planning.
//!
//! Turns the day's anniversaries and the enabled lead times into one-shot
//! alert jobs. Planning is pure: the same inputs always give the same jobs,
//! and nothing here talks to the execution substrate.

use std::collections::HashSet;

use chrono::{Days, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::offset::{AlertOffsets, LeadTimeOffset};
use super::payload::AlertPayload;
use crate::anniversary::Anniversary;

/// Hour of day at which every alert fires unless configured otherwise.
pub const DEFAULT_ALERT_HOUR: u32 = 9;

/// 09:00:00 local time.
pub fn default_alert_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_ALERT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// A single future alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertJob {
    pub subject: String,
    pub offset: LeadTimeOffset,
    /// Local wall-clock instant the alert is due.
    pub fire_at: NaiveDateTime,
    pub payload: AlertPayload,
}

impl AlertJob {
    pub fn tag(&self) -> &'static str {
        self.offset.tag()
    }
}

/// Builds alert jobs from anniversaries.
#[derive(Debug, Clone, Copy)]
pub struct AlertPlanner {
    alert_time: NaiveTime,
}

impl Default for AlertPlanner {
    fn default() -> Self {
        Self {
            alert_time: default_alert_time(),
        }
    }
}

impl AlertPlanner {
    pub fn new(alert_time: NaiveTime) -> Self {
        Self { alert_time }
    }

    pub fn alert_time(&self) -> NaiveTime {
        self.alert_time
    }

    /// Plan every alert still ahead of `now`.
    ///
    /// For each anniversary and enabled offset `d`, the alert fires `d` days
    /// before the occurrence at the alert time. It is emitted only when
    /// `days_until >= d` and the fire instant is strictly after `now`. A
    /// (subject, offset) pair is planned at most once; the first anniversary
    /// in input order wins.
    pub fn plan(
        &self,
        anniversaries: &[Anniversary],
        offsets: &AlertOffsets,
        now: NaiveDateTime,
    ) -> Vec<AlertJob> {
        let mut seen: HashSet<(&str, LeadTimeOffset)> = HashSet::new();
        let mut jobs = Vec::new();

        for anniversary in anniversaries {
            for offset in offsets.enabled() {
                let lead = offset.days();
                if anniversary.days_until < lead {
                    continue;
                }
                let Some(target_day) = anniversary
                    .occurrence
                    .checked_sub_days(Days::new(u64::from(lead)))
                else {
                    continue;
                };
                let fire_at = target_day.and_time(self.alert_time);
                if fire_at <= now {
                    continue;
                }
                if !seen.insert((anniversary.name.as_str(), offset)) {
                    tracing::debug!(name = %anniversary.name, ?offset, "duplicate subject skipped");
                    continue;
                }

                jobs.push(AlertJob {
                    subject: anniversary.name.clone(),
                    offset,
                    fire_at,
                    payload: AlertPayload {
                        name: anniversary.name.clone(),
                        kind: offset.kind(),
                        age: anniversary.next_age,
                        days: (lead > 0).then_some(lead),
                    },
                });
            }
        }

        jobs
    }
}
