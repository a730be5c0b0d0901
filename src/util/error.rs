// logrange - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Errors are grouped by the subsystem that produced them and aggregated
// into `LogRangeError` at the application boundary.

use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all logrange operations.
#[derive(Debug)]
pub enum LogRangeError {
    /// A log record could not be built.
    Record(RecordError),

    /// Range filter construction failed.
    Filter(FilterError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// An input log file could not be opened or read.
    Input { path: PathBuf, source: io::Error },

    /// An input path pattern is not a valid glob.
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

impl fmt::Display for LogRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(e) => write!(f, "Record error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Input { path, source } => write!(
                f,
                "File '{}' cannot be opened or read: {source}",
                path.display()
            ),
            Self::Pattern { pattern, source } => {
                write!(f, "Invalid input pattern '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for LogRangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Record(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Input { source, .. } => Some(source),
            Self::Pattern { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Record errors
// ---------------------------------------------------------------------------

/// Errors raised while building a `LogRecord` from extracted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The request method is not one of the accepted HTTP methods.
    MalformedRequest { method: String },

    /// The bracketed timestamp does not follow the access log format.
    TimestampFormat { raw: String, format: &'static str },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRequest { method } => {
                write!(f, "request method '{method}' is not an accepted HTTP method")
            }
            Self::TimestampFormat { raw, format } => {
                write!(f, "cannot parse timestamp '{raw}' with format '{format}'")
            }
        }
    }
}

impl std::error::Error for RecordError {}

impl From<RecordError> for LogRangeError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to range filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The end bound precedes the start bound.
    InvertedRange {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// A user-supplied bound is neither an access log timestamp nor RFC 3339.
    InvalidBound { raw: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedRange { start, end } => write!(
                f,
                "Finish date cannot be earlier than the start! ({end} < {start})"
            ),
            Self::InvalidBound { raw } => write!(
                f,
                "Invalid time bound '{raw}'. Expected '18/Oct/2020:10:59:54 +0200' \
                 or RFC 3339 ('2020-10-18T10:59:54+02:00')"
            ),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<FilterError> for LogRangeError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing filtered records.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output.
    Io { target: String, source: io::Error },

    /// CSV serialisation error.
    Csv { target: String, source: csv::Error },

    /// JSON serialisation error.
    Json {
        target: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { target, source } => write!(f, "Export I/O error '{target}': {source}"),
            Self::Csv { target, source } => write!(f, "CSV export error '{target}': {source}"),
            Self::Json { target, source } => {
                write!(f, "JSON export error '{target}': {source}")
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogRangeError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is outside its accepted set.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading the config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogRangeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for logrange results.
pub type Result<T> = std::result::Result<T, LogRangeError>;
