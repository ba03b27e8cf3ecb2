//! Lead-time offsets and the alert kinds they produce.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

pub const SAME_DAY_TAG: &str = "birthday_same_day";
pub const THREE_DAY_TAG: &str = "birthday_three_day";
pub const SEVEN_DAY_TAG: &str = "birthday_seven_day";

/// One of the fixed lead times at which an alert may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTimeOffset {
    SameDay,
    ThreeDay,
    SevenDay,
}

impl LeadTimeOffset {
    pub const ALL: [LeadTimeOffset; 3] = [Self::SameDay, Self::ThreeDay, Self::SevenDay];

    /// Days before the anniversary.
    pub fn days(self) -> u32 {
        match self {
            Self::SameDay => 0,
            Self::ThreeDay => 3,
            Self::SevenDay => 7,
        }
    }

    /// Cancellation tag for every job in this bucket.
    pub fn tag(self) -> &'static str {
        match self {
            Self::SameDay => SAME_DAY_TAG,
            Self::ThreeDay => THREE_DAY_TAG,
            Self::SevenDay => SEVEN_DAY_TAG,
        }
    }

    pub fn kind(self) -> AlertKind {
        match self.days() {
            0 => AlertKind::SameDay,
            n => AlertKind::Advance(n),
        }
    }
}

/// Which lead times are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertOffsets {
    pub same_day: bool,
    pub three_day: bool,
    pub seven_day: bool,
}

impl AlertOffsets {
    pub fn none() -> Self {
        Self {
            same_day: false,
            three_day: false,
            seven_day: false,
        }
    }

    pub fn all() -> Self {
        Self {
            same_day: true,
            three_day: true,
            seven_day: true,
        }
    }

    pub fn only(offset: LeadTimeOffset) -> Self {
        let mut offsets = Self::none();
        offsets.set(offset, true);
        offsets
    }

    pub fn is_enabled(&self, offset: LeadTimeOffset) -> bool {
        match offset {
            LeadTimeOffset::SameDay => self.same_day,
            LeadTimeOffset::ThreeDay => self.three_day,
            LeadTimeOffset::SevenDay => self.seven_day,
        }
    }

    pub fn set(&mut self, offset: LeadTimeOffset, enabled: bool) {
        match offset {
            LeadTimeOffset::SameDay => self.same_day = enabled,
            LeadTimeOffset::ThreeDay => self.three_day = enabled,
            LeadTimeOffset::SevenDay => self.seven_day = enabled,
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = LeadTimeOffset> + '_ {
        LeadTimeOffset::ALL
            .into_iter()
            .filter(move |o| self.is_enabled(*o))
    }
}

impl Default for AlertOffsets {
    fn default() -> Self {
        Self::only(LeadTimeOffset::SameDay)
    }
}

/// What an alert announces. Travels in the job payload as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    SameDay,
    /// The anniversary is this many days away.
    Advance(u32),
}

impl AlertKind {
    pub fn lead_days(self) -> u32 {
        match self {
            Self::SameDay => 0,
            Self::Advance(n) => n,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameDay => f.write_str("same_day"),
            Self::Advance(n) => write!(f, "{n}_day_advance"),
        }
    }
}

impl FromStr for AlertKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "same_day" {
            return Ok(Self::SameDay);
        }
        s.strip_suffix("_day_advance")
            .and_then(|n| n.parse().ok())
            .map(Self::Advance)
            .ok_or_else(|| CoreError::InvalidPayload(format!("unknown alert type '{s}'")))
    }
}

impl Serialize for AlertKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AlertKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_days_tags_and_kinds() {
        assert_eq!(LeadTimeOffset::SameDay.days(), 0);
        assert_eq!(LeadTimeOffset::ThreeDay.tag(), "birthday_three_day");
        assert_eq!(LeadTimeOffset::SevenDay.kind(), AlertKind::Advance(7));
        assert_eq!(LeadTimeOffset::SameDay.kind(), AlertKind::SameDay);
    }

    #[test]
    fn tags_are_distinct() {
        let mut tags: Vec<_> = LeadTimeOffset::ALL.iter().map(|o| o.tag()).collect();
        tags.dedup();
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn default_enables_same_day_only() {
        let enabled: Vec<_> = AlertOffsets::default().enabled().collect();
        assert_eq!(enabled, vec![LeadTimeOffset::SameDay]);
    }

    #[test]
    fn set_toggles_independently() {
        let mut offsets = AlertOffsets::none();
        offsets.set(LeadTimeOffset::SevenDay, true);
        assert!(offsets.seven_day);
        assert!(!offsets.three_day);
        assert!(!offsets.same_day);
        assert_eq!(offsets.enabled().count(), 1);
    }

    #[test]
    fn kind_text_form() {
        assert_eq!(AlertKind::SameDay.to_string(), "same_day");
        assert_eq!(AlertKind::Advance(3).to_string(), "3_day_advance");
        assert_eq!("7_day_advance".parse::<AlertKind>().unwrap(), AlertKind::Advance(7));
        assert_eq!("same_day".parse::<AlertKind>().unwrap(), AlertKind::SameDay);
        assert!("weekly".parse::<AlertKind>().is_err());
        assert!("x_day_advance".parse::<AlertKind>().is_err());
    }
}
