use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clock::jst;
use crate::error::{Error, Result};

/// Default config filename, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "daybook.toml";

/// Overrides `notes.repo_root`
pub const ENV_NOTES_ROOT: &str = "DAYBOOK_NOTES_ROOT";

/// Overrides `clock.utc_offset`
pub const ENV_UTC_OFFSET: &str = "DAYBOOK_UTC_OFFSET";

/// Notes repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotesConfig {
    /// Root of the notes repository; reports live under `docs/journal/`
    #[serde(default)]
    pub repo_root: Option<PathBuf>,

    /// Branch the notes repository is published from
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self { repo_root: None, default_branch: default_branch() }
    }
}

/// Clock settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockConfig {
    /// Fixed UTC offset for every generated timestamp, e.g. `+09:00`
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_utc_offset() -> String {
    jst().to_string()
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { utc_offset: default_utc_offset() }
    }
}

/// Daily summarizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive for stderr, e.g. `warn` or `daybook_store=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty`, `json` or `compact`; picked from the terminal when unset
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub file: FileLoggingConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: None, file: FileLoggingConfig::default() }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_file_log_level")]
    pub level: String,

    /// Log directory (default: `~/.daybook/logs`)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_log_level(), directory: None }
    }
}

/// Root configuration structure for daybook.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub notes: NotesConfig,

    #[serde(default)]
    pub clock: ClockConfig,

    #[serde(default)]
    pub observer: ObserverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(|e| Error::Config(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Read `path` if it exists (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() { Self::from_file(path)? } else { Self::default() };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `DAYBOOK_*` overrides from the given lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(ENV_NOTES_ROOT).filter(|v| !v.trim().is_empty()) {
            self.notes.repo_root = Some(PathBuf::from(root));
        }
        if let Some(offset) = lookup(ENV_UTC_OFFSET).filter(|v| !v.trim().is_empty()) {
            self.clock.utc_offset = offset;
        }
    }

    /// The journal root, or a configuration error when unset
    pub fn notes_root(&self) -> Result<&Path> {
        self.notes.repo_root.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "notes.repo_root must be set (in {} or via {})",
                DEFAULT_CONFIG_FILE, ENV_NOTES_ROOT
            ))
        })
    }

    /// The configured fixed offset
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.clock
            .utc_offset
            .trim()
            .parse::<FixedOffset>()
            .map_err(|e| Error::Config(format!("invalid clock.utc_offset '{}': {}", self.clock.utc_offset, e)))
    }

    fn validate(&self) -> Result<()> {
        if let Some(root) = &self.notes.repo_root
            && root.as_os_str().is_empty()
        {
            return Err(Error::Config("notes.repo_root cannot be empty".to_string()));
        }

        self.utc_offset()?;
        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# daybook configuration
# Copy this file to daybook.toml and customize as needed

[notes]
# Root of the notes repository (reports go to <repo_root>/docs/journal/)
# Can also be set with DAYBOOK_NOTES_ROOT
repo_root = "/path/to/notes"
default_branch = "main"

[clock]
# Fixed UTC offset for all timestamps (JST by default)
utc_offset = "+09:00"

[observer]
# Allow `daybook observe` to write the daily summary
enabled = true

[logging]
# Filter directive for stderr (overridden by DAYBOOK_LOG / RUST_LOG)
level = "warn"
# "pretty", "json" or "compact" (default: pretty on a terminal, compact otherwise)
# format = "pretty"

[logging.file]
enabled = false
level = "debug"
# directory = "/var/log/daybook"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_example_parses() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert_eq!(config.notes.repo_root, Some(PathBuf::from("/path/to/notes")));
        assert_eq!(config.notes.default_branch, "main");
        assert_eq!(config.utc_offset().unwrap(), jst());
        assert!(config.observer.enabled);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.file.enabled);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.notes.repo_root.is_none());
        assert_eq!(config.clock.utc_offset, "+09:00");
        assert!(config.observer.enabled);
        assert!(config.logging.format.is_none());
        assert_eq!(config.logging.file.level, "debug");
    }

    #[test]
    fn test_explicit_log_format() {
        let config = Config::from_toml_str("[logging]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let config = Config::default();
        let err = config.notes_root().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("notes.repo_root"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = Config::from_toml_str("[notes]\nrepo = \"/tmp\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let result = Config::from_toml_str("[clock]\nutc_offset = \"JST\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_custom_offset() {
        let config = Config::from_toml_str("[clock]\nutc_offset = \"-05:00\"\n").unwrap();
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_toml_str(Config::example()).unwrap();
        let env: HashMap<&str, &str> = [(ENV_NOTES_ROOT, "/srv/notes"), (ENV_UTC_OFFSET, "+00:00")].into();

        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.notes_root().unwrap(), Path::new("/srv/notes"));
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::from_toml_str(Config::example()).unwrap();
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.notes_root().unwrap(), Path::new("/path/to/notes"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("absent.toml")).unwrap();
        assert!(config.observer.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[observer]\nenabled = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.observer.enabled);
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "invalid toml").unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}
