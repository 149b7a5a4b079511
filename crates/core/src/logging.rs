//! Logging setup built on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `DAYBOOK_LOG`: Filter directive (like `RUST_LOG`), e.g., `daybook_store=debug`
//! - `DAYBOOK_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `DAYBOOK_LOG_DIR`: Directory for file logs when `[logging.file]` is enabled
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! # format = "pretty"  (default: pretty on a terminal, compact otherwise)
//!
//! [logging.file]
//! enabled = false
//! level = "debug"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use daybook_core::logging;
//!
//! let _guard = logging::init_logging(None)?;
//! # Ok::<(), daybook_core::Error>(())
//! ```

use crate::Error;
use crate::config::LoggingConfig as ConfigLoggingConfig;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filename prefix of the daily-rolling log file
pub const LOG_FILE_NAME: &str = "daybook.log";

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// File sink settings
#[derive(Debug, Clone)]
pub struct FileLogging {
    pub level: String,
    pub directory: Option<PathBuf>,
}

/// Runtime logging settings, bridged from the `[logging]` config section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter for stderr output.
    pub level: String,
    /// Output format for stderr; `None` picks one from the terminal.
    pub format: Option<LogFormat>,
    /// File logging (disabled when `None`).
    pub file: Option<FileLogging>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: None, file: None }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        Self {
            level: config.level,
            format: config.format.as_deref().and_then(LogFormat::parse_str),
            file: config
                .file
                .enabled
                .then(|| FileLogging { level: config.file.level, directory: config.file.directory }),
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_file_logging(mut self, file: FileLogging) -> Self {
        self.file = Some(file);
        self
    }

    /// Filter directive: `DAYBOOK_LOG`, then `RUST_LOG`, then the configured level.
    fn filter_directive(&self) -> String {
        env::var("DAYBOOK_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone())
    }

    /// Determine the stderr format: env override, explicit config, then TTY detection.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("DAYBOOK_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if let Some(format) = self.format {
            return format;
        }

        if atty::is(atty::Stream::Stderr) { LogFormat::Pretty } else { LogFormat::Compact }
    }

    fn log_dir(&self, file: &FileLogging) -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("DAYBOOK_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        if let Some(dir) = &file.directory {
            return Ok(dir.clone());
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".daybook").join("logs"))
    }
}

/// Initialize the global tracing subscriber.
///
/// Sets up an env-based filter, formatted stderr output and, when configured,
/// a daily-rolling JSON log file. Keep the returned guard alive for the life
/// of the process so buffered file output is flushed.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let stderr_filter = EnvFilter::new(config.filter_directive());
    let format = config.detect_format();

    let stderr_layer = match format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).boxed(),
    }
    .with_filter(stderr_filter);

    let registry = Registry::default().with(stderr_layer);

    let Some(file) = &config.file else {
        registry
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;
        return Ok(None);
    };

    let log_dir = config.log_dir(file)?;
    std::fs::create_dir_all(&log_dir).map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new(&file.level));

    registry
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(Some(guard))
}

/// Sanitize file paths for logging (replace the home directory with `~`).
pub fn sanitize_path(path: &Path) -> String {
    if let Ok(home) = env::var("HOME")
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}
