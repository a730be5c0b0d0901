// logrange - core/convert.rs
//
// Batch conversion of access log lines into validated records.
// Core layer: accepts line iterators or BufRead objects, never opens files.
//
// Per-line failures never escape this module; they are folded into
// `SkipCounts` and reported once per batch through a `ConversionSink`.

use crate::core::extract::extract;
use crate::core::model::LogRecord;
use crate::util::constants;
use crate::util::error::RecordError;
use std::io::{self, BufRead};

// =============================================================================
// Per-line outcome
// =============================================================================

/// Why a line did not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The line does not have the access log shape.
    UnrecognizedLine,
    /// The shape matched but the method is not an accepted HTTP method.
    MalformedRequest { method: String },
    /// The shape matched but the bracketed timestamp could not be parsed.
    TimestampFormat { raw: String },
}

impl From<RecordError> for SkipReason {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::MalformedRequest { method } => SkipReason::MalformedRequest { method },
            RecordError::TimestampFormat { raw, .. } => SkipReason::TimestampFormat { raw },
        }
    }
}

/// Result of converting a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Valid(LogRecord),
    Skipped(SkipReason),
}

/// Convert one line into a record or a skip reason.
pub fn convert_line(line: &str) -> LineOutcome {
    let Some(fields) = extract(line) else {
        return LineOutcome::Skipped(SkipReason::UnrecognizedLine);
    };
    match LogRecord::from_fields(&fields) {
        Ok(record) => LineOutcome::Valid(record),
        Err(e) => LineOutcome::Skipped(e.into()),
    }
}

// =============================================================================
// Skip accounting
// =============================================================================

/// Number of skipped lines per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub unrecognized: usize,
    pub malformed_request: usize,
    pub bad_timestamp: usize,
}

impl SkipCounts {
    /// Total lines skipped for any reason.
    pub fn total(&self) -> usize {
        self.unrecognized + self.malformed_request + self.bad_timestamp
    }

    fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::UnrecognizedLine => self.unrecognized += 1,
            SkipReason::MalformedRequest { .. } => self.malformed_request += 1,
            SkipReason::TimestampFormat { .. } => self.bad_timestamp += 1,
        }
    }

    fn add(&mut self, other: &SkipCounts) {
        self.unrecognized += other.unrecognized;
        self.malformed_request += other.malformed_request;
        self.bad_timestamp += other.bad_timestamp;
    }
}

/// Receives the skip summary once a batch has been fully converted.
pub trait ConversionSink {
    fn report(&mut self, skipped: &SkipCounts);
}

/// Reports the batch summary through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ConversionSink for TracingSink {
    fn report(&mut self, skipped: &SkipCounts) {
        if skipped.total() > 0 {
            tracing::warn!(
                total = skipped.total(),
                unrecognized = skipped.unrecognized,
                malformed_request = skipped.malformed_request,
                bad_timestamp = skipped.bad_timestamp,
                "Found {} request(s) of an inappropriate form",
                skipped.total()
            );
        } else {
            tracing::info!("All lines converted");
        }
    }
}

impl ConversionSink for Vec<SkipCounts> {
    fn report(&mut self, skipped: &SkipCounts) {
        self.push(*skipped);
    }
}

// =============================================================================
// Batch conversion
// =============================================================================

/// Records converted from one batch of lines, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    /// Valid records in source order.
    pub records: Vec<LogRecord>,
    pub skipped: SkipCounts,
}

impl Conversion {
    fn push(&mut self, line_number: usize, line: &str) {
        match convert_line(line) {
            LineOutcome::Valid(record) => self.records.push(record),
            LineOutcome::Skipped(reason) => {
                tracing::trace!(
                    line_number,
                    reason = ?reason,
                    line = %preview(line),
                    "Line skipped"
                );
                self.skipped.record(&reason);
            }
        }
    }
}

/// Convert every line, preserving source order, and report the skip summary
/// to `sink` once after the whole batch.
pub fn convert_lines<I, S>(lines: I, sink: &mut dyn ConversionSink) -> Conversion
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let conversion = lines
        .into_iter()
        .enumerate()
        .fold(Conversion::default(), |mut acc, (idx, line)| {
            acc.push(idx + 1, line.as_ref());
            acc
        });
    finish(conversion, sink)
}

/// Convert every line read from `reader`.
///
/// A line that is not valid UTF-8 is counted as unrecognized. Any other
/// read failure aborts the batch and is returned to the caller; it is never
/// counted as a skipped line, and nothing is reported to `sink`.
pub fn convert_reader<R: BufRead>(
    reader: R,
    sink: &mut dyn ConversionSink,
) -> io::Result<Conversion> {
    let mut conversion = Conversion::default();
    for (idx, line_result) in reader.lines().enumerate() {
        match line_result {
            Ok(line) => conversion.push(idx + 1, &line),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::trace!(line_number = idx + 1, "Skipping line with encoding error");
                conversion.skipped.record(&SkipReason::UnrecognizedLine);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(finish(conversion, sink))
}

fn finish(conversion: Conversion, sink: &mut dyn ConversionSink) -> Conversion {
    tracing::debug!(
        records = conversion.records.len(),
        skipped = conversion.skipped.total(),
        "Conversion complete"
    );
    sink.report(&conversion.skipped);
    conversion
}

/// Merge independently converted batches into one chronological batch.
///
/// Batches are concatenated in the given order and then stable-sorted by
/// timestamp, so records with equal timestamps keep their input order.
pub fn merge_chronological(batches: Vec<Conversion>) -> Conversion {
    let mut merged = Conversion::default();
    for batch in batches {
        merged.records.extend(batch.records);
        merged.skipped.add(&batch.skipped);
    }
    merged.records.sort_by_key(|r| r.timestamp());
    merged
}

fn preview(line: &str) -> &str {
    match line.char_indices().nth(constants::DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::HttpMethod;

    const SCENARIO: &[&str] = &[
        r#"10.0.0.1 - - [18/Oct/2020:11:00:00 +0200] "GET /a HTTP/1.1" 200 100"#,
        r#"10.0.0.2 - - [18/Oct/2020:12:00:00 +0200] "POST /b HTTP/1.1" 404 50"#,
        "malformed line with no structure",
        r#"10.0.0.3 - - [18/Oct/2020:13:00:00 +0200] "DOWNLOAD /c HTTP/1.1" 200 10"#,
    ];

    #[test]
    fn test_convert_line_outcomes() {
        assert!(matches!(convert_line(SCENARIO[0]), LineOutcome::Valid(_)));
        assert_eq!(
            convert_line(SCENARIO[2]),
            LineOutcome::Skipped(SkipReason::UnrecognizedLine)
        );
        assert_eq!(
            convert_line(SCENARIO[3]),
            LineOutcome::Skipped(SkipReason::MalformedRequest {
                method: "DOWNLOAD".to_string()
            })
        );
    }

    #[test]
    fn test_scenario_counts_and_order() {
        let mut sink: Vec<SkipCounts> = Vec::new();
        let result = convert_lines(SCENARIO.iter().copied(), &mut sink);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].request().method(), HttpMethod::Get);
        assert_eq!(result.records[0].request().path(), "/a");
        assert_eq!(result.records[1].request().method(), HttpMethod::Post);
        assert_eq!(result.records[1].request().path(), "/b");

        assert_eq!(result.skipped.total(), 2);
        assert_eq!(result.skipped.unrecognized, 1);
        assert_eq!(result.skipped.malformed_request, 1);
        assert_eq!(result.skipped.bad_timestamp, 0);
    }

    #[test]
    fn test_summary_reported_exactly_once() {
        let mut sink: Vec<SkipCounts> = Vec::new();
        let result = convert_lines(SCENARIO.iter().copied(), &mut sink);
        assert_eq!(sink, vec![result.skipped]);

        let mut sink: Vec<SkipCounts> = Vec::new();
        convert_lines(Vec::<String>::new(), &mut sink);
        assert_eq!(sink, vec![SkipCounts::default()]);
    }

    #[test]
    fn test_each_bad_method_counts_once() {
        let mut sink: Vec<SkipCounts> = Vec::new();
        let lines = [
            r#"10.0.0.1 - - [18/Oct/2020:11:00:00 +0200] "FETCH /a HTTP/1.1" 200 100"#,
            r#"10.0.0.1 - - [18/Oct/2020:11:00:01 +0200] "GET /a HTTP/1.1" 200 100"#,
            r#"10.0.0.1 - - [18/Oct/2020:11:00:02 +0200] "PURGE /a HTTP/1.1" 200 100"#,
        ];
        let result = convert_lines(lines, &mut sink);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.skipped.malformed_request, 2);
        assert_eq!(result.skipped.total(), 2);
    }

    #[test]
    fn test_bad_timestamp_counted_separately() {
        let mut sink: Vec<SkipCounts> = Vec::new();
        let lines = [r#"10.0.0.1 - - [2020-10-18 11:00:00] "GET /a HTTP/1.1" 200 100"#];
        let result = convert_lines(lines, &mut sink);
        assert!(result.records.is_empty());
        assert_eq!(result.skipped.bad_timestamp, 1);
        assert_eq!(result.skipped.total(), 1);
    }

    #[test]
    fn test_convert_reader_matches_convert_lines() {
        let text = SCENARIO.join("\n");
        let mut sink: Vec<SkipCounts> = Vec::new();
        let from_reader = convert_reader(text.as_bytes(), &mut sink).unwrap();
        let from_lines = convert_lines(SCENARIO.iter().copied(), &mut sink);
        assert_eq!(from_reader, from_lines);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_convert_reader_propagates_io_error() {
        struct Failing;
        impl io::Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
            }
        }

        let mut sink: Vec<SkipCounts> = Vec::new();
        let result = convert_reader(io::BufReader::new(Failing), &mut sink);
        assert!(result.is_err());
        assert!(sink.is_empty(), "no summary for an aborted batch");
    }

    #[test]
    fn test_convert_reader_skips_invalid_utf8_line() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(SCENARIO[0].as_bytes());
        bytes.extend_from_slice(
            b"\n10.0.0.5 - - [18/Oct/2020:11:30:00 +0200] \"GET /\xff\xfe HTTP/1.1\" 200 7\n",
        );
        bytes.extend_from_slice(SCENARIO[1].as_bytes());
        bytes.push(b'\n');

        let mut sink: Vec<SkipCounts> = Vec::new();
        let result = convert_reader(bytes.as_slice(), &mut sink).unwrap();

        let paths: Vec<_> = result.records.iter().map(|r| r.request().path()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
        assert_eq!(result.skipped.unrecognized, 1);
        assert_eq!(result.skipped.total(), 1);
        assert_eq!(sink, vec![result.skipped]);
    }

    #[test]
    fn test_merge_is_chronological_and_stable() {
        let mut sink: Vec<SkipCounts> = Vec::new();
        let a = convert_lines(
            [
                r#"10.0.0.1 - - [18/Oct/2020:12:00:00 +0200] "GET /a1 HTTP/1.1" 200 100"#,
                "junk",
            ],
            &mut sink,
        );
        let b = convert_lines(
            [
                r#"10.0.0.2 - - [18/Oct/2020:11:00:00 +0200] "GET /b1 HTTP/1.1" 200 100"#,
                r#"10.0.0.2 - - [18/Oct/2020:12:00:00 +0200] "GET /b2 HTTP/1.1" 200 100"#,
            ],
            &mut sink,
        );

        let merged = merge_chronological(vec![a, b]);
        let paths: Vec<_> = merged.records.iter().map(|r| r.request().path()).collect();
        assert_eq!(paths, vec!["/b1", "/a1", "/b2"]);
        assert_eq!(merged.skipped.unrecognized, 1);
    }

    #[test]
    fn test_preview_truncates_long_lines() {
        let long = "x".repeat(constants::DEBUG_MAX_LINE_PREVIEW + 50);
        assert_eq!(preview(&long).len(), constants::DEBUG_MAX_LINE_PREVIEW);
        assert_eq!(preview("short"), "short");
    }
}
