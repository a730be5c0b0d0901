// logrange - app/analyse.rs
//
// The analysis pipeline: open inputs → convert (parallel per file) →
// merge → range filter → export.
//
// Per-line problems are absorbed by the converter. An input that cannot be
// opened or read, an inverted range, or an output failure stops the run.

use crate::core::convert::{self, Conversion, SkipCounts, TracingSink};
use crate::core::export::{self, ExportFormat};
use crate::core::filter::TimeRange;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{ExportError, FilterError, LogRangeError, Result};
use chrono::{DateTime, FixedOffset};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything one analysis run needs.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Input log files, already expanded from patterns.
    pub inputs: Vec<PathBuf>,
    /// Inclusive lower bound. `None` means the earliest record.
    pub start: Option<DateTime<FixedOffset>>,
    /// Inclusive upper bound. `None` means the latest record.
    pub end: Option<DateTime<FixedOffset>>,
    pub format: ExportFormat,
}

/// What an analysis run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisReport {
    pub files: usize,
    pub records: usize,
    pub selected: usize,
    pub skipped: SkipCounts,
    pub range: Option<TimeRange>,
}

/// Convert a single log file.
pub fn convert_file(path: &Path) -> Result<Conversion> {
    let span = tracing::info_span!("convert", file = %path.display());
    let _guard = span.enter();

    let input_err = |source| LogRangeError::Input {
        path: path.to_path_buf(),
        source,
    };
    let reader = fs::open_log(path).map_err(input_err)?;
    convert::convert_reader(reader, &mut TracingSink).map_err(input_err)
}

/// Convert every input, one file per rayon task.
///
/// A single input keeps its source order; several inputs are merged into
/// chronological order. The first unreadable input fails the whole load.
pub fn load_inputs(paths: &[PathBuf]) -> Result<Conversion> {
    let mut batches: Vec<Conversion> = paths
        .par_iter()
        .map(|path| convert_file(path))
        .collect::<Result<Vec<_>>>()?;

    let conversion = if batches.len() == 1 {
        batches.pop().unwrap_or_default()
    } else {
        convert::merge_chronological(batches)
    };

    tracing::info!(
        files = paths.len(),
        records = conversion.records.len(),
        skipped = conversion.skipped.total(),
        "Inputs converted"
    );
    Ok(conversion)
}

/// Resolve the effective range, filling a missing bound from the records.
///
/// A filled bound never crosses the given one: a lone start after the
/// latest record (or a lone end before the earliest) collapses the range to
/// that single instant. Returns `Ok(None)` when a bound is missing and there
/// are no records to take it from.
pub fn resolve_range(
    conversion: &Conversion,
    start: Option<DateTime<FixedOffset>>,
    end: Option<DateTime<FixedOffset>>,
) -> std::result::Result<Option<TimeRange>, FilterError> {
    let span = TimeRange::spanning(&conversion.records);
    let start = start.or_else(|| span.map(|s| end.map_or(s.start(), |e| s.start().min(e))));
    let end = end.or_else(|| span.map(|s| start.map_or(s.end(), |b| s.end().max(b))));
    match (start, end) {
        (Some(start), Some(end)) => TimeRange::new(start, end).map(Some),
        _ => Ok(None),
    }
}

/// Inputs converted and range resolved, ready to be written.
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub conversion: Conversion,
    pub range: Option<TimeRange>,
    pub files: usize,
}

/// Check the range, then convert every input and resolve the effective range.
///
/// Nothing is written, so a caller can defer opening its output until this
/// succeeds.
pub fn prepare(request: &AnalysisRequest) -> Result<PreparedAnalysis> {
    // Reject an explicit inverted range before touching any input.
    if let (Some(start), Some(end)) = (request.start, request.end) {
        TimeRange::new(start, end)?;
    }

    let conversion = load_inputs(&request.inputs)?;
    let range = resolve_range(&conversion, request.start, request.end)?;
    Ok(PreparedAnalysis {
        conversion,
        range,
        files: request.inputs.len(),
    })
}

/// Write the records of a prepared analysis that fall inside its range.
///
/// `target` names the output in error messages.
pub fn write_selected<W: Write>(
    prepared: &PreparedAnalysis,
    format: ExportFormat,
    mut writer: W,
    target: &str,
) -> Result<AnalysisReport> {
    if format == ExportFormat::Text {
        write_text_header(&mut writer, prepared.range.as_ref(), target)?;
    }

    let records = &prepared.conversion.records;
    let selected = match prepared.range {
        Some(range) => export::export(format, range.select(records), &mut writer, target)?,
        None => export::export(format, std::iter::empty(), &mut writer, target)?,
    };

    tracing::info!(selected, "Range filter applied");

    Ok(AnalysisReport {
        files: prepared.files,
        records: records.len(),
        selected,
        skipped: prepared.conversion.skipped,
        range: prepared.range,
    })
}

/// Run the full pipeline, writing selected records to `writer`.
pub fn run<W: Write>(
    request: &AnalysisRequest,
    writer: W,
    target: &str,
) -> Result<AnalysisReport> {
    let prepared = prepare(request)?;
    write_selected(&prepared, request.format, writer, target)
}

fn write_text_header<W: Write>(
    writer: &mut W,
    range: Option<&TimeRange>,
    target: &str,
) -> Result<()> {
    let line = match range {
        Some(range) => format!(
            "Logs between dates: {} - {}",
            range.start().format(constants::DISPLAY_TIMESTAMP_FORMAT),
            range.end().format(constants::DISPLAY_TIMESTAMP_FORMAT)
        ),
        None => "Logs between dates:".to_string(),
    };
    writeln!(writer, "{line}").map_err(|source| {
        LogRangeError::from(ExportError::Io {
            target: target.to_string(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::parse_bound;
    use std::fs as stdfs;

    const LOG_A: &str = "\
10.0.0.1 - - [18/Oct/2020:11:00:00 +0200] \"GET /a HTTP/1.1\" 200 100
10.0.0.2 - - [18/Oct/2020:12:00:00 +0200] \"POST /b HTTP/1.1\" 404 50
malformed line with no structure
10.0.0.3 - - [18/Oct/2020:13:00:00 +0200] \"DOWNLOAD /c HTTP/1.1\" 200 10
";

    fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        stdfs::write(&path, content).unwrap();
        path
    }

    fn request(inputs: Vec<PathBuf>, start: &str, end: &str) -> AnalysisRequest {
        AnalysisRequest {
            inputs,
            start: Some(parse_bound(start).unwrap()),
            end: Some(parse_bound(end).unwrap()),
            format: ExportFormat::Text,
        }
    }

    #[test]
    fn test_run_selects_inclusive_window() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "access_log.txt", LOG_A);
        let req = request(
            vec![log],
            "18/Oct/2020:11:00:00 +0200",
            "18/Oct/2020:12:00:00 +0200",
        );

        let mut out: Vec<u8> = Vec::new();
        let report = run(&req, &mut out, "buffer").unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(report.selected, 2);
        assert_eq!(report.skipped.total(), 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("Logs between dates:"));
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("path - /a"));
        assert!(lines[2].contains("path - /b"));
    }

    #[test]
    fn test_run_window_after_valid_records_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "access_log.txt", LOG_A);
        let req = request(
            vec![log],
            "18/Oct/2020:12:00:01 +0200",
            "18/Oct/2020:13:00:00 +0200",
        );

        let mut out: Vec<u8> = Vec::new();
        let report = run(&req, &mut out, "buffer").unwrap();
        assert_eq!(report.selected, 0);
    }

    #[test]
    fn test_inverted_range_fails_before_reading() {
        let req = request(
            vec![PathBuf::from("does/not/exist.log")],
            "18/Oct/2020:13:00:00 +0200",
            "18/Oct/2020:11:00:00 +0200",
        );
        let mut out: Vec<u8> = Vec::new();
        let err = run(&req, &mut out, "buffer").unwrap_err();
        assert!(matches!(
            err,
            LogRangeError::Filter(FilterError::InvertedRange { .. })
        ));
        assert!(out.is_empty(), "no output for an inverted range");
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let req = request(
            vec![PathBuf::from("does/not/exist.log")],
            "18/Oct/2020:11:00:00 +0200",
            "18/Oct/2020:12:00:00 +0200",
        );
        let err = run(&req, Vec::<u8>::new(), "buffer").unwrap_err();
        assert!(matches!(err, LogRangeError::Input { .. }));
    }

    #[test]
    fn test_multiple_files_merge_chronologically() {
        let dir = tempfile::tempdir().unwrap();
        let late = write_log(
            dir.path(),
            "late.log",
            "10.0.0.9 - - [18/Oct/2020:14:00:00 +0200] \"GET /late HTTP/1.1\" 200 1\n",
        );
        let early = write_log(dir.path(), "early.log", LOG_A);

        let conversion = load_inputs(&[late, early]).unwrap();
        let paths: Vec<_> = conversion
            .records
            .iter()
            .map(|r| r.request().path())
            .collect();
        assert_eq!(paths, vec!["/a", "/b", "/late"]);
        assert_eq!(conversion.skipped.total(), 2);
    }

    #[test]
    fn test_missing_bounds_span_all_records() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "access_log.txt", LOG_A);
        let req = AnalysisRequest {
            inputs: vec![log],
            start: None,
            end: None,
            format: ExportFormat::Csv,
        };

        let mut out: Vec<u8> = Vec::new();
        let report = run(&req, &mut out, "buffer").unwrap();
        assert_eq!(report.selected, 2);
        let range = report.range.unwrap();
        assert_eq!(range.start(), parse_bound("18/Oct/2020:11:00:00 +0200").unwrap());
        assert_eq!(range.end(), parse_bound("18/Oct/2020:12:00:00 +0200").unwrap());

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("timestamp,"), "CSV output has no text header");
    }

    #[test]
    fn test_lone_start_after_latest_record_selects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "access_log.txt", LOG_A);
        let req = AnalysisRequest {
            inputs: vec![log],
            start: Some(parse_bound("19/Oct/2020:00:00:00 +0200").unwrap()),
            end: None,
            format: ExportFormat::Text,
        };

        let mut out: Vec<u8> = Vec::new();
        let report = run(&req, &mut out, "buffer").unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.selected, 0);
        let range = report.range.unwrap();
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn test_lone_end_before_earliest_record_selects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "access_log.txt", LOG_A);
        let req = AnalysisRequest {
            inputs: vec![log],
            start: None,
            end: Some(parse_bound("17/Oct/2020:23:59:59 +0200").unwrap()),
            format: ExportFormat::Json,
        };

        let mut out: Vec<u8> = Vec::new();
        let report = run(&req, &mut out, "buffer").unwrap();
        assert_eq!(report.selected, 0);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_lone_bound_inside_data_uses_record_span() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "access_log.txt", LOG_A);
        let conversion = load_inputs(&[log]).unwrap();
        let start = parse_bound("18/Oct/2020:11:30:00 +0200").unwrap();

        let range = resolve_range(&conversion, Some(start), None).unwrap().unwrap();
        assert_eq!(range.start(), start);
        assert_eq!(range.end(), parse_bound("18/Oct/2020:12:00:00 +0200").unwrap());
    }

    #[test]
    fn test_prepare_fails_before_any_output_exists() {
        let req = request(
            vec![PathBuf::from("does/not/exist.log")],
            "18/Oct/2020:11:00:00 +0200",
            "18/Oct/2020:12:00:00 +0200",
        );
        assert!(matches!(prepare(&req), Err(LogRangeError::Input { .. })));
    }

    #[test]
    fn test_no_records_and_no_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), "empty.log", "nothing useful\n");
        let conversion = load_inputs(&[log]).unwrap();
        assert_eq!(resolve_range(&conversion, None, None), Ok(None));
    }
}
