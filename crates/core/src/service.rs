//! Report query service
//!
//! Composes repository reads with in-memory filtering, sorting and
//! aggregation. Never touches the filesystem directly.

use crate::clock::Clock;
use crate::error::Result;
use crate::report::{Report, ReportAuthor, ReportMeta, ReportStats, ReportType, make_note_id};
use crate::repository::ReportRepository;

use chrono::{DateTime, Duration, FixedOffset};
use std::sync::Arc;
use tracing::instrument;
use url::Url;

/// Default lookback for listing and statistics
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Fixed lookback for keyword search
pub const SEARCH_WINDOW_DAYS: i64 = 365;

/// Input for [`ReportService::create_report`]
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub body: String,
    pub report_type: ReportType,
    pub author: ReportAuthor,
    pub tags: Vec<String>,
    pub source_urls: Vec<Url>,
}

impl NewReport {
    /// A user-authored report with no tags or sources
    pub fn new(title: impl Into<String>, body: impl Into<String>, report_type: ReportType) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            report_type,
            author: ReportAuthor::default(),
            tags: Vec::new(),
            source_urls: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: ReportAuthor) -> Self {
        self.author = author;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_source_urls(mut self, urls: Vec<Url>) -> Self {
        self.source_urls = urls;
        self
    }
}

/// Filters for [`ReportService::list_reports`]
///
/// Every field is optional; `since` defaults to [`DEFAULT_WINDOW_DAYS`] ago.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub since: Option<DateTime<FixedOffset>>,
    pub report_type: Option<ReportType>,
    pub author: Option<ReportAuthor>,
    /// Matches reports carrying at least one of these tags
    pub tags: Option<Vec<String>>,
}

/// Which fields a keyword search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchScope {
    pub title: bool,
    pub body: bool,
    pub tags: bool,
}

impl SearchScope {
    pub const ALL: SearchScope = SearchScope { title: true, body: true, tags: true };

    pub fn title_only() -> Self {
        Self { title: true, body: false, tags: false }
    }

    pub fn body_only() -> Self {
        Self { title: false, body: true, tags: false }
    }

    pub fn tags_only() -> Self {
        Self { title: false, body: false, tags: true }
    }

    /// Case-insensitive substring match of an already lower-cased keyword
    fn matches(&self, report: &Report, keyword_lower: &str) -> bool {
        (self.title && report.meta.title.to_lowercase().contains(keyword_lower))
            || (self.body && report.body.to_lowercase().contains(keyword_lower))
            || (self.tags
                && report
                    .meta
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(keyword_lower)))
    }
}

impl Default for SearchScope {
    fn default() -> Self {
        Self::ALL
    }
}

/// Business logic behind the `create`, `list`, `search` and `stats` commands
pub struct ReportService {
    repo: Arc<dyn ReportRepository>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(repo: Arc<dyn ReportRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Stamp, name and persist a new report
    #[instrument(skip_all, fields(title = %new.title, report_type = %new.report_type))]
    pub fn create_report(&self, new: NewReport) -> Result<Report> {
        let now = self.clock.now();
        let meta = ReportMeta {
            note_id: make_note_id(new.report_type, &new.title, now),
            title: new.title,
            created_at: now,
            updated_at: now,
            report_type: new.report_type,
            author: new.author,
            tags: new.tags,
            source_urls: new.source_urls,
        };

        let report = Report::new(meta, new.body);
        self.repo.save(&report)?;
        tracing::info!(note_id = %report.meta.note_id, "report created");
        Ok(report)
    }

    /// Filtered listing, most recently updated first
    #[instrument(skip_all)]
    pub fn list_reports(&self, query: &ListQuery) -> Result<Vec<Report>> {
        let since = query.since.unwrap_or_else(|| self.days_ago(DEFAULT_WINDOW_DAYS));
        let mut reports = self.repo.find_recent(since)?;

        if let Some(report_type) = query.report_type {
            reports.retain(|r| r.meta.report_type == report_type);
        }

        if let Some(author) = query.author {
            reports.retain(|r| r.meta.author == author);
        }

        if let Some(tags) = &query.tags
            && !tags.is_empty()
        {
            reports.retain(|r| r.meta.has_any_tag(tags));
        }

        sort_newest_first(&mut reports);

        if let Some(limit) = query.limit {
            reports.truncate(limit);
        }

        tracing::debug!(count = reports.len(), %since, "listed reports");
        Ok(reports)
    }

    /// Keyword search over the last [`SEARCH_WINDOW_DAYS`] days
    #[instrument(skip(self))]
    pub fn search_reports(&self, keyword: &str, scope: SearchScope) -> Result<Vec<Report>> {
        let since = self.days_ago(SEARCH_WINDOW_DAYS);
        let keyword_lower = keyword.to_lowercase();

        let mut results: Vec<Report> = self
            .repo
            .find_recent(since)?
            .into_iter()
            .filter(|r| scope.matches(r, &keyword_lower))
            .collect();

        sort_newest_first(&mut results);
        Ok(results)
    }

    /// Aggregate over reports since `since` (default [`DEFAULT_WINDOW_DAYS`] ago)
    ///
    /// `period_end` is the moment of the call.
    #[instrument(skip(self))]
    pub fn get_statistics(&self, since: Option<DateTime<FixedOffset>>) -> Result<ReportStats> {
        let since = since.unwrap_or_else(|| self.days_ago(DEFAULT_WINDOW_DAYS));
        let reports = self.repo.find_recent(since)?;
        Ok(ReportStats::from_reports(&reports, since, self.clock.now()))
    }

    fn days_ago(&self, days: i64) -> DateTime<FixedOffset> {
        self.clock.now() - Duration::days(days)
    }
}

fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.meta.updated_at.cmp(&a.meta.updated_at));
}
