use crate::error::{Error, Result};

use chrono::NaiveDate;
use daybook_core::report::{REPORT_EXTENSION, Report};
use std::path::{Path, PathBuf};

/// Journal directory relative to the notes root
pub const JOURNAL_DIR: [&str; 2] = ["docs", "journal"];

/// Path arithmetic for the `docs/journal/YYYY/MM/DD` tree
#[derive(Debug, Clone)]
pub struct JournalPaths {
    root: PathBuf,
}

impl JournalPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The notes repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/docs/journal`
    pub fn journal_dir(&self) -> PathBuf {
        JOURNAL_DIR.iter().fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Partition directory for one calendar day
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.journal_dir()
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string())
            .join(date.format("%d").to_string())
    }

    /// Where a report lives, from its note-ID and creation date
    pub fn report_path(&self, report: &Report) -> PathBuf {
        self.day_dir(report.meta.created_at.date_naive())
            .join(format!("{}.{}", report.meta.note_id, REPORT_EXTENSION))
    }

    /// `path` relative to the notes root
    pub fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        path.strip_prefix(&self.root)
            .map_err(|_| Error::invalid_partition(path))
    }
}
