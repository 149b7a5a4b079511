//! Aggregate statistics over a set of reports

use crate::report::Report;

use chrono::{DateTime, FixedOffset};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Number of tags kept in [`ReportStats::top_tags`]
pub const TOP_TAGS_LIMIT: usize = 10;

/// Insertion-ordered counter keyed by string
///
/// Keys appear in the order they were first counted, which is what breaks
/// ties when sorting by count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `key`
    pub fn increment(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key.to_string(), 1)),
        }
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Entries ordered by count, highest first; ties keep insertion order
    pub fn sorted_by_count(&self) -> Vec<(&str, usize)> {
        let mut sorted: Vec<(&str, usize)> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }

    /// A new tally holding only the `n` highest counts, in descending order
    pub fn top(&self, n: usize) -> Self {
        let entries = self
            .sorted_by_count()
            .into_iter()
            .take(n)
            .map(|(k, c)| (k.to_string(), c))
            .collect();
        Self { entries }
    }
}

impl<'a> FromIterator<&'a str> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.increment(key);
        }
        tally
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Derived, never-persisted aggregate over a window of reports
#[derive(Debug, Clone, Serialize)]
pub struct ReportStats {
    pub total_count: usize,
    pub period_start: DateTime<FixedOffset>,
    pub period_end: DateTime<FixedOffset>,
    /// Only types observed in the window are present
    pub by_type: Tally,
    /// Only authors observed in the window are present
    pub by_author: Tally,
    /// At most [`TOP_TAGS_LIMIT`] entries
    pub top_tags: Tally,
}

impl ReportStats {
    pub fn from_reports(
        reports: &[Report], period_start: DateTime<FixedOffset>, period_end: DateTime<FixedOffset>,
    ) -> Self {
        let by_type: Tally = reports.iter().map(|r| r.meta.report_type.as_str()).collect();
        let by_author: Tally = reports.iter().map(|r| r.meta.author.as_str()).collect();
        let all_tags: Tally = reports
            .iter()
            .flat_map(|r| r.meta.tags.iter().map(String::as_str))
            .collect();

        Self {
            total_count: reports.len(),
            period_start,
            period_end,
            by_type,
            by_author,
            top_tags: all_tags.top(TOP_TAGS_LIMIT),
        }
    }
}
