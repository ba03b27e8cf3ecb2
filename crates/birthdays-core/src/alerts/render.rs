//! User-facing alert text.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::offset::AlertKind;
use super::payload::AlertPayload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedAlert {
    pub title: String,
    pub body: String,
}

/// Title and body for a fired alert.
pub fn render(payload: &AlertPayload) -> RenderedAlert {
    let title = match payload.kind {
        AlertKind::SameDay => "Birthday Today",
        AlertKind::Advance(3) => "Birthday in 3 Days",
        AlertKind::Advance(7) => "Birthday in 7 Days",
        AlertKind::Advance(_) => "Birthday Reminder",
    };

    let name = &payload.name;
    let body = match (payload.kind, payload.age) {
        (AlertKind::SameDay, Some(age)) => format!("{name} is turning {age} today!"),
        (AlertKind::SameDay, None) => format!("{name}'s birthday is today!"),
        (kind, age) => {
            let days = payload.days.unwrap_or(kind.lead_days());
            match age {
                Some(age) => format!("{name} will turn {age} in {days} days"),
                None => format!("{name}'s birthday is in {days} days"),
            }
        }
    };

    RenderedAlert {
        title: title.to_string(),
        body,
    }
}

/// Stable identifier for one (subject, kind) alert.
///
/// Re-delivering an alert with the same id replaces the earlier one instead
/// of stacking a duplicate.
pub fn dedupe_id(name: &str, kind: AlertKind) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update([0u8]);
    hasher.update(kind.to_string().as_bytes());
    hex::encode(&hasher.finalize()[..8])
}
