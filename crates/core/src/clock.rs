//! Time source for the journal
//!
//! Every timestamp in the journal lives in a single fixed zone (JST by
//! default). The clock is passed explicitly into the store and services so
//! tests can pin "now".

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// UTC offset of Japan Standard Time, in seconds
pub const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Japan Standard Time (+09:00)
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Source of the current zoned timestamp
pub trait Clock: Send + Sync {
    /// Current time in the clock's zone
    fn now(&self) -> DateTime<FixedOffset>;

    /// The zone this clock reports in
    fn offset(&self) -> FixedOffset {
        *self.now().offset()
    }
}

/// Wall clock normalized to a fixed offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(jst())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Parse an RFC 3339 timestamp, e.g. `2025-01-15T10:30:00+09:00`
    pub fn at(rfc3339: &str) -> crate::Result<Self> {
        DateTime::parse_from_rfc3339(rfc3339)
            .map(Self::new)
            .map_err(|e| crate::Error::parse(format!("invalid timestamp '{rfc3339}': {e}")))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}
