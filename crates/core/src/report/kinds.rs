//! Report type and author enums
//!
//! Both sets are closed: adding a variant is a compile-time-visible change at
//! every `match` in the workspace.

use crate::Error;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broad category of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Technical notes and implementation logs
    Tech,
    /// Paper reading notes
    Paper,
    /// Life log
    Life,
    /// System and self-observation reports
    Meta,
}

impl ReportType {
    pub const VALUES: &[ReportType] = &[ReportType::Tech, ReportType::Paper, ReportType::Life, ReportType::Meta];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Tech => "tech",
            ReportType::Paper => "paper",
            ReportType::Life => "life",
            ReportType::Meta => "meta",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VALUES.iter().copied().find(|t| t.as_str() == s).ok_or_else(|| {
            Error::validation(format!(
                "invalid type '{s}'. Use: {}",
                Self::VALUES.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

/// Who wrote a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReportAuthor {
    /// Written by hand through the CLI
    #[default]
    #[serde(rename = "user")]
    User,
    /// The scheduled daily summarizer
    #[serde(rename = "agent:self_observer")]
    SelfObserver,
    #[serde(rename = "agent:summarizer")]
    Summarizer,
    /// Imported from an external note-sharing service
    #[serde(rename = "agent:ingestor")]
    Ingestor,
}

impl ReportAuthor {
    pub const VALUES: &[ReportAuthor] = &[
        ReportAuthor::User,
        ReportAuthor::SelfObserver,
        ReportAuthor::Summarizer,
        ReportAuthor::Ingestor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportAuthor::User => "user",
            ReportAuthor::SelfObserver => "agent:self_observer",
            ReportAuthor::Summarizer => "agent:summarizer",
            ReportAuthor::Ingestor => "agent:ingestor",
        }
    }

    /// Check if this author is an automated agent
    pub fn is_agent(self) -> bool {
        !matches!(self, ReportAuthor::User)
    }
}

impl fmt::Display for ReportAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportAuthor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VALUES
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::validation(format!("invalid author '{s}'")))
    }
}
