//! Note-ID generation
//!
//! Format: `YYYY-MM-DD-HHMM-<type>-<slug>`. The ID doubles as the on-disk
//! filename stem, so it sorts chronologically within a day directory.

use crate::report::ReportType;

use chrono::{DateTime, FixedOffset};

/// Maximum slug length, in characters
pub const SLUG_MAX_CHARS: usize = 40;

/// Timestamp prefix format of a note-ID
pub const NOTE_ID_TIME_FORMAT: &str = "%Y-%m-%d-%H%M";

/// Replace spaces and `/` with `-` and cut the result to [`SLUG_MAX_CHARS`].
///
/// No other characters are touched, and nothing prevents two long titles
/// sharing a prefix from producing the same slug.
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .map(|c| if c == ' ' || c == '/' { '-' } else { c })
        .take(SLUG_MAX_CHARS)
        .collect()
}

/// Build a note-ID from a type tag, a title (or pre-made slug) and a timestamp
pub fn make_note_id(report_type: ReportType, title_or_slug: &str, now: DateTime<FixedOffset>) -> String {
    format!(
        "{}-{}-{}",
        now.format(NOTE_ID_TIME_FORMAT),
        report_type.as_str(),
        slugify(title_or_slug)
    )
}
