// logrange - core/filter.rs
//
// Inclusive timestamp range selection over converted records.
// Core layer: pure logic, read-only over its input.

use crate::core::model::{parse_log_timestamp, LogRecord};
use crate::util::error::FilterError;
use chrono::{DateTime, FixedOffset};

/// A closed time interval. Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl TimeRange {
    /// Build a range, rejecting an end that precedes the start.
    ///
    /// Bounds in different offsets are compared as instants.
    pub fn new(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, FilterError> {
        if end < start {
            return Err(FilterError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Smallest range covering every record, or `None` for no records.
    pub fn spanning(records: &[LogRecord]) -> Option<Self> {
        let start = records.iter().map(LogRecord::timestamp).min()?;
        let end = records.iter().map(LogRecord::timestamp).max()?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// True when `ts` lies within the range, bounds included.
    pub fn contains(&self, ts: &DateTime<FixedOffset>) -> bool {
        self.start <= *ts && *ts <= self.end
    }

    /// Lazily select, in input order, the records inside the range.
    pub fn select<'a>(&self, records: &'a [LogRecord]) -> impl Iterator<Item = &'a LogRecord> {
        let range = *self;
        records
            .iter()
            .filter(move |record| range.contains(&record.timestamp()))
    }
}

/// Select the records whose timestamp lies within `[start, end]`.
///
/// An inverted interval is an error and yields nothing; an empty selection
/// is a valid result.
pub fn filter_range<'a>(
    records: &'a [LogRecord],
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Result<impl Iterator<Item = &'a LogRecord>, FilterError> {
    let range = TimeRange::new(start, end)?;
    Ok(range.select(records))
}

/// Parse a user-supplied range bound.
///
/// Accepts the access log form (`18/Oct/2020:10:59:54 +0200`) or RFC 3339.
pub fn parse_bound(raw: &str) -> Result<DateTime<FixedOffset>, FilterError> {
    let trimmed = raw.trim();
    parse_log_timestamp(trimmed)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok())
        .ok_or_else(|| FilterError::InvalidBound {
            raw: raw.to_string(),
        })
}
