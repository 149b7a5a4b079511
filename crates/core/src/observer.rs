//! Daily self-observation report
//!
//! Summarizes the last 24 hours of journal activity into a `meta` report
//! authored by `agent:self_observer` and writes it back through the
//! repository.

use crate::clock::Clock;
use crate::error::Result;
use crate::report::{Report, ReportAuthor, ReportMeta, ReportStats, ReportType, Tally, make_note_id};
use crate::repository::ReportRepository;

use chrono::{DateTime, Duration, FixedOffset};
use std::sync::Arc;
use tracing::instrument;

/// Slug used for every daily report's note-ID
pub const DAILY_REPORT_SLUG: &str = "daily-report";

/// Tags attached to every daily report
pub const DAILY_REPORT_TAGS: &[&str] = &["daily-report", "meta"];

/// Lookback window of the daily report, in hours
pub const DAILY_WINDOW_HOURS: i64 = 24;

pub struct DailySummarizer {
    repo: Arc<dyn ReportRepository>,
    clock: Arc<dyn Clock>,
}

impl DailySummarizer {
    pub fn new(repo: Arc<dyn ReportRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Aggregate the last 24 hours, persist the summary and return it.
    ///
    /// Store failures propagate as-is; nothing is retried.
    #[instrument(skip_all)]
    pub fn analyze_daily_activity(&self) -> Result<Report> {
        let now = self.clock.now();
        let since = now - Duration::hours(DAILY_WINDOW_HOURS);

        let recent = self.repo.find_recent(since)?;
        let stats = ReportStats::from_reports(&recent, since, now);

        let meta = ReportMeta {
            note_id: make_note_id(ReportType::Meta, DAILY_REPORT_SLUG, now),
            title: format!("Daily Activity Report {}", now.format("%Y-%m-%d")),
            created_at: now,
            updated_at: now,
            report_type: ReportType::Meta,
            author: ReportAuthor::SelfObserver,
            tags: DAILY_REPORT_TAGS.iter().map(|t| t.to_string()).collect(),
            source_urls: Vec::new(),
        };

        let report = Report::new(meta, render_body(&stats, since, now));
        let location = self.repo.save(&report)?;
        tracing::info!(
            note_id = %report.meta.note_id,
            total = stats.total_count,
            location = %location.display(),
            "daily report written"
        );

        Ok(report)
    }
}

/// Render the markdown body of a daily report
pub fn render_body(stats: &ReportStats, since: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> String {
    let mut body = format!("# Daily Activity Report ({})\n\n", now.format("%Y-%m-%d"));

    body.push_str("**Period**: ");
    body.push_str(&since.format("%Y-%m-%d %H:%M").to_string());
    body.push_str(" ~ ");
    body.push_str(&now.format("%H:%M").to_string());
    body.push_str("\n\n");

    body.push_str("## Summary\n\n");
    body.push_str(&format!("- **Total Reports**: {}\n", stats.total_count));

    render_section(&mut body, "By Type", &stats.by_type);
    render_section(&mut body, "By Author", &stats.by_author);
    render_section(&mut body, "Top Tags", &stats.top_tags);

    body
}

fn render_section(body: &mut String, heading: &str, tally: &Tally) {
    body.push_str("\n### ");
    body.push_str(heading);
    body.push_str("\n\n");
    for (key, count) in tally.sorted_by_count() {
        body.push_str(&format!("- **{key}**: {count}\n"));
    }
}
