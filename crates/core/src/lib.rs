pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod observer;
pub mod report;
pub mod repository;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock, jst};
pub use config::{Config, LoggingConfig, ObserverConfig};
pub use error::{Error, Result};
pub use logging::{LogFormat, init_logging};
pub use observer::DailySummarizer;
pub use report::{Report, ReportAuthor, ReportMeta, ReportStats, ReportType, Tally, make_note_id, slugify};
pub use repository::{InMemoryReportRepository, ReportRepository};
pub use service::{ListQuery, NewReport, ReportService, SearchScope};
