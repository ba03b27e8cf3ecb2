//! The resolved set of tracked anniversaries for one day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::raw_date::RawDate;
use super::resolver::{AnniversaryResolver, Resolution};
use crate::contacts::ContactRecord;

/// A tracked person's next anniversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anniversary {
    pub name: String,
    pub raw: RawDate,
    pub occurrence: NaiveDate,
    pub days_until: u32,
    pub next_age: Option<i32>,
}

impl Anniversary {
    pub fn new(name: impl Into<String>, raw: RawDate, resolution: Resolution) -> Self {
        Self {
            name: name.into(),
            raw,
            occurrence: resolution.occurrence,
            days_until: resolution.days_until,
            next_age: resolution.next_age,
        }
    }

    pub fn is_today(&self) -> bool {
        self.days_until == 0
    }
}

/// Anniversaries ordered by days until their next occurrence.
///
/// Rebuilt from the contact source on every query; never updated in place.
#[derive(Debug, Clone, Serialize)]
pub struct AnniversaryCollection {
    today: NaiveDate,
    items: Vec<Anniversary>,
}

impl AnniversaryCollection {
    /// Resolve every record against `today`.
    ///
    /// Records whose date fails to parse or resolve are dropped. Ties on
    /// `days_until` keep source order.
    pub fn build(
        records: &[ContactRecord],
        today: NaiveDate,
        resolver: &AnniversaryResolver,
    ) -> Self {
        let mut items: Vec<Anniversary> = records
            .iter()
            .filter_map(|record| {
                let resolved = record
                    .birthday
                    .parse::<RawDate>()
                    .and_then(|raw| resolver.resolve(&raw, today).map(|r| (raw, r)));
                match resolved {
                    Ok((raw, resolution)) => Some(Anniversary::new(&record.name, raw, resolution)),
                    Err(e) => {
                        tracing::debug!(name = %record.name, "skipping contact: {e}");
                        None
                    }
                }
            })
            .collect();

        items.sort_by_key(|a| a.days_until);
        Self { today, items }
    }

    pub fn empty(today: NaiveDate) -> Self {
        Self {
            today,
            items: Vec::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn as_slice(&self) -> &[Anniversary] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Anniversary> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Anniversaries falling on `today`.
    pub fn todays(&self) -> impl Iterator<Item = &Anniversary> {
        self.items.iter().take_while(|a| a.is_today())
    }
}

impl<'a> IntoIterator for &'a AnniversaryCollection {
    type Item = &'a Anniversary;
    type IntoIter = std::slice::Iter<'a, Anniversary>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
