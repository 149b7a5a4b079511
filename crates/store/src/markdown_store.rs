//! Markdown-file-backed report store
//!
//! One file per report, named `<note_id>.md`, inside the day partition of its
//! `created_at` date. Every query re-scans the tree; there is no index.
use crate::error::{Error, Result};
use crate::paths::JournalPaths;

use chrono::{DateTime, FixedOffset, NaiveDate};
use daybook_core::clock::Clock;
use daybook_core::logging::sanitize_path;
use daybook_core::report::{REPORT_EXTENSION, Report};
use daybook_core::repository::ReportRepository;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

pub struct MarkdownReportStore {
    paths: JournalPaths,
    clock: Arc<dyn Clock>,
}

impl MarkdownReportStore {
    /// Store rooted at a notes repository; the clock decides what "today" is
    /// when scanning.
    pub fn new(notes_root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self { paths: JournalPaths::new(notes_root), clock }
    }

    pub fn paths(&self) -> &JournalPaths {
        &self.paths
    }

    /// Write `report` into its day partition, replacing any file with the same
    /// note-ID. Returns the absolute path written.
    #[instrument(skip_all, fields(note_id = %report.meta.note_id))]
    pub fn write_report(&self, report: &Report) -> Result<PathBuf> {
        let path = self.paths.report_path(report);
        let content = report
            .to_markdown()
            .map_err(|e| Error::encode(&report.meta.note_id, e))?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, content)?;

        let path = std::path::absolute(&path)?;
        tracing::info!(path = %sanitize_path(&path), "saved report");
        Ok(path)
    }

    /// Parse every report in the partitions from `since`'s date through today
    /// and keep those with `updated_at >= since`.
    #[instrument(skip(self))]
    pub fn scan_since(&self, since: DateTime<FixedOffset>) -> Result<Vec<Report>> {
        let today = self.clock.now().with_timezone(&since.timezone()).date_naive();
        let mut day = since.date_naive();
        let mut reports = Vec::new();

        while day <= today {
            reports.extend(
                self.scan_day(day)?
                    .into_iter()
                    .filter(|r| r.meta.updated_at >= since),
            );
            day = day
                .succ_opt()
                .ok_or_else(|| Error::invalid_partition(self.paths.day_dir(day)))?;
        }

        tracing::debug!(count = reports.len(), %today, "scanned journal");
        Ok(reports)
    }

    /// All parseable reports directly inside one day partition
    fn scan_day(&self, day: NaiveDate) -> Result<Vec<Report>> {
        let dir = self.paths.day_dir(day);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reports = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(REPORT_EXTENSION) {
                continue;
            }

            if let Some(report) = read_report(&path) {
                reports.push(report);
            }
        }

        Ok(reports)
    }
}

/// Read and parse one report file, logging and skipping anything unreadable.
fn read_report(path: &Path) -> Option<Report> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %sanitize_path(path), error = %e, "skipping unreadable report");
            return None;
        }
    };

    match Report::parse(&content) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::debug!(path = %sanitize_path(path), error = %e, "skipping malformed report");
            None
        }
    }
}

impl ReportRepository for MarkdownReportStore {
    fn save(&self, report: &Report) -> daybook_core::Result<PathBuf> {
        Ok(self.write_report(report)?)
    }

    fn find_recent(&self, since: DateTime<FixedOffset>) -> daybook_core::Result<Vec<Report>> {
        Ok(self.scan_since(since)?)
    }
}
