//! The date-keyed collection of daily records and its merge rule.
//!
//! A [`Dataset`] never holds two records for the same [`CalendarDate`].
//! Merging is last-write-wins: an incoming record replaces any existing one
//! for its date, untouched records keep their relative order, and incoming
//! records are appended in the order given. Re-merging the same records is a
//! no-op, so overlapping runs can be repeated safely.

use std::collections::{HashMap, HashSet};

use crate::date::CalendarDate;
use crate::record::DailyRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<DailyRecord>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from rows that may repeat a date; the last row wins.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = DailyRecord>) -> Self {
        Self {
            records: dedup_keep_last(records.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn get(&self, date: CalendarDate) -> Option<&DailyRecord> {
        self.records.iter().find(|r| r.date() == date)
    }

    /// Merges `incoming` into this dataset in place.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = DailyRecord>) {
        let incoming = dedup_keep_last(incoming.into_iter().collect());
        if incoming.is_empty() {
            return;
        }
        let replaced: HashSet<CalendarDate> = incoming.iter().map(DailyRecord::date).collect();
        self.records.retain(|r| !replaced.contains(&r.date()));
        self.records.extend(incoming);
    }

    /// Consuming form of [`Dataset::merge`].
    #[must_use]
    pub fn merged(mut self, incoming: impl IntoIterator<Item = DailyRecord>) -> Self {
        self.merge(incoming);
        self
    }

    /// Records ordered by date, most recent first.
    #[must_use]
    pub fn newest_first(&self) -> Vec<&DailyRecord> {
        let mut sorted: Vec<&DailyRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| std::cmp::Reverse(r.date()));
        sorted
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Merges `incoming` into an optional previously persisted dataset.
///
/// With no existing dataset the result is exactly the incoming records.
#[must_use]
pub fn merge_records(
    existing: Option<Dataset>,
    incoming: impl IntoIterator<Item = DailyRecord>,
) -> Dataset {
    match existing {
        Some(dataset) => dataset.merged(incoming),
        None => Dataset::from_records(incoming),
    }
}

/// Drops every record whose date reappears later in `records`.
fn dedup_keep_last(records: Vec<DailyRecord>) -> Vec<DailyRecord> {
    let mut last_index: HashMap<CalendarDate, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        last_index.insert(record.date(), i);
    }
    records
        .into_iter()
        .enumerate()
        .filter(|(i, r)| last_index.get(&r.date()) == Some(i))
        .map(|(_, r)| r)
        .collect()
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
