//! Journal reports
//!
//! A report is a dated markdown note with YAML front matter, stored under a
//! date-partitioned directory tree:
//!
//! ```text
//! <repo_root>/docs/journal/
//! └── 2025/
//!     └── 01/
//!         └── 15/
//!             └── 2025-01-15-1030-tech-Hello-World.md
//! ```
//!
//! # Example
//!
//! ```ignore
//! use daybook_core::report::{make_note_id, Report, ReportMeta, ReportType, ReportAuthor};
//!
//! let now = clock.now();
//! let meta = ReportMeta {
//!     note_id: make_note_id(ReportType::Tech, "Hello World", now),
//!     title: "Hello World".to_string(),
//!     created_at: now,
//!     updated_at: now,
//!     report_type: ReportType::Tech,
//!     author: ReportAuthor::User,
//!     tags: vec!["rust".to_string()],
//!     source_urls: vec![],
//! };
//! let content = Report::new(meta, "content").to_markdown()?;
//! ```

mod document;
mod kinds;
mod naming;
mod stats;

pub use document::{FRONT_MATTER_DELIMITER, Report, ReportMeta};
pub use kinds::{ReportAuthor, ReportType};
pub use naming::{NOTE_ID_TIME_FORMAT, SLUG_MAX_CHARS, make_note_id, slugify};
pub use stats::{ReportStats, TOP_TAGS_LIMIT, Tally};

/// File extension of stored reports
pub const REPORT_EXTENSION: &str = "md";
