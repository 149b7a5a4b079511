//! Report document format
//!
//! A stored report is a markdown file with a YAML front matter block:
//!
//! ```markdown
//! ---
//! note_id: 2025-01-15-1030-tech-Hello-World
//! title: Hello World
//! created_at: 2025-01-15T10:30:00+09:00
//! updated_at: 2025-01-15T10:30:00+09:00
//! type: tech
//! author: user
//! tags:
//! - rust
//! source_urls: []
//! ---
//!
//! Body content here
//! ```
//!
//! Field order in the front matter follows the declaration order of
//! [`ReportMeta`].

use crate::error::{Error, Result};
use crate::report::kinds::{ReportAuthor, ReportType};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use url::Url;

/// Front matter delimiter line
pub const FRONT_MATTER_DELIMITER: &str = "---";

/// Structured metadata of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Unique ID, also the filename stem
    pub note_id: String,
    pub title: String,
    /// Set once at construction
    #[serde(with = "rfc3339")]
    pub created_at: DateTime<FixedOffset>,
    /// Changes only when a report is amended
    #[serde(with = "rfc3339")]
    pub updated_at: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub author: ReportAuthor,
    /// Display order is preserved; matching ignores it
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_urls: Vec<Url>,
}

/// A journal entry: metadata plus a free-form markdown body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub body: String,
}

impl ReportMeta {
    /// Check whether the report carries any of the given tags
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }
}

impl Report {
    pub fn new(meta: ReportMeta, body: impl Into<String>) -> Self {
        Self { meta, body: body.into() }
    }

    /// Build the replacement for this report: same note-ID and creation time,
    /// new body, newer `updated_at`.
    ///
    /// Saving the result overwrites the original file in place.
    pub fn amended(&self, body: impl Into<String>, updated_at: DateTime<FixedOffset>) -> Result<Self> {
        if updated_at < self.meta.updated_at {
            return Err(Error::validation(format!(
                "amendment of {} must not move updated_at backwards",
                self.meta.note_id
            )));
        }

        let mut meta = self.meta.clone();
        meta.updated_at = updated_at;
        Ok(Self { meta, body: body.into() })
    }

    /// Serialize to the on-disk representation
    ///
    /// `---\n<yaml>---\n\n<body without trailing whitespace>\n`
    pub fn to_markdown(&self) -> Result<String> {
        let yaml = serde_yml::to_string(&self.meta)?;
        let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);
        let newline = if yaml.ends_with('\n') { "" } else { "\n" };

        Ok(format!(
            "{FRONT_MATTER_DELIMITER}\n{yaml}{newline}{FRONT_MATTER_DELIMITER}\n\n{}\n",
            self.body.trim_end()
        ))
    }

    /// Parse a stored report
    ///
    /// The first line must be exactly `---`. The front matter runs up to the
    /// next line that is exactly `---`; everything after it (including any
    /// later `---` lines) is the body. A `---` inside a line is plain text.
    pub fn parse(content: &str) -> Result<Self> {
        let (first_line, rest) = content.split_once('\n').unwrap_or((content, ""));
        if first_line.trim_end() != FRONT_MATTER_DELIMITER {
            return Err(Error::parse("missing opening front matter delimiter"));
        }

        let (front_matter, body) =
            split_at_delimiter_line(rest).ok_or_else(|| Error::parse("missing closing front matter delimiter"))?;

        let meta: ReportMeta = serde_yml::from_str(front_matter)?;

        Ok(Self { meta, body: body.trim().to_string() })
    }
}

/// Split `text` around its first line consisting only of the delimiter.
fn split_at_delimiter_line(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_DELIMITER {
            return Some((&text[..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// RFC 3339 timestamps with an explicit UTC offset
mod rfc3339 {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(dt: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
    }
}
