//! Markdown journal store
//!
//! Persists reports as markdown files with YAML front matter under a
//! date-partitioned tree and implements [`daybook_core::ReportRepository`].
//!
//! # Example
//!
//! ```ignore
//! use daybook_core::{ReportRepository, SystemClock};
//! use daybook_store::MarkdownReportStore;
//!
//! let store = MarkdownReportStore::new("/path/to/notes", Arc::new(SystemClock::default()));
//! let path = store.save(&report)?;
//! let recent = store.find_recent(since)?;
//! ```

mod error;
mod markdown_store;
mod paths;

pub use error::{Error, Result};
pub use markdown_store::MarkdownReportStore;
pub use paths::{JOURNAL_DIR, JournalPaths};
