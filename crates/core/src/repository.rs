//! Storage abstraction for reports
//!
//! The query service and summarizer only see [`ReportRepository`]; the
//! markdown-file store lives in `daybook-store`.

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::report::Report;

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Durable mapping from note-ID to report
pub trait ReportRepository: Send + Sync {
    /// Persist a report, replacing any report with the same note-ID.
    ///
    /// Returns the location written.
    fn save(&self, report: &Report) -> Result<PathBuf>;

    /// Reports created on or after `since`'s date whose `updated_at >= since`.
    ///
    /// Order is unspecified. Unreadable entries are skipped, not reported.
    fn find_recent(&self, since: DateTime<FixedOffset>) -> Result<Vec<Report>>;
}

/// Repository held entirely in memory
///
/// Useful for tests and for callers that want the query service without a
/// journal on disk. Like the markdown store, `find_recent` only sees reports
/// created between `since`'s date and the clock's today.
pub struct InMemoryReportRepository {
    reports: Mutex<BTreeMap<String, Report>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryReportRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock::default()))
    }
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { reports: Mutex::new(BTreeMap::new()), clock }
    }

    /// Number of stored reports
    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a report by note-ID
    pub fn get(&self, note_id: &str) -> Option<Report> {
        self.reports.lock().ok()?.get(note_id).cloned()
    }
}

impl ReportRepository for InMemoryReportRepository {
    fn save(&self, report: &Report) -> Result<PathBuf> {
        let mut reports = self
            .reports
            .lock()
            .map_err(|_| Error::Other("report repository lock poisoned".to_string()))?;
        reports.insert(report.meta.note_id.clone(), report.clone());

        Ok(PathBuf::from(format!("memory://{}", report.meta.note_id)))
    }

    fn find_recent(&self, since: DateTime<FixedOffset>) -> Result<Vec<Report>> {
        let reports = self
            .reports
            .lock()
            .map_err(|_| Error::Other("report repository lock poisoned".to_string()))?;

        let since_date = since.date_naive();
        let today = self.clock.now().with_timezone(&since.timezone()).date_naive();
        Ok(reports
            .values()
            .filter(|r| (since_date..=today).contains(&r.meta.created_at.date_naive()))
            .filter(|r| r.meta.updated_at >= since)
            .cloned()
            .collect())
    }
}
