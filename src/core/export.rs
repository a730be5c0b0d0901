// logrange - core/export.rs
//
// Text, CSV and JSON rendering of selected log records.
// Core layer: writes to any Write trait object. `target` names the
// destination in error messages only.

use crate::core::model::LogRecord;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;

/// Output format for selected records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One `Log: ...` line per record.
    #[default]
    Text,
    Csv,
    Json,
}

impl ExportFormat {
    /// Parse a case-insensitive format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Write records in `format`, returning how many were written.
pub fn export<'a, I, W>(
    format: ExportFormat,
    records: I,
    writer: W,
    target: &str,
) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a LogRecord>,
    W: Write,
{
    match format {
        ExportFormat::Text => export_text(records, writer, target),
        ExportFormat::Csv => export_csv(records, writer, target),
        ExportFormat::Json => export_json(records, writer, target),
    }
}

/// Write one display line per record.
pub fn export_text<'a, I, W>(records: I, mut writer: W, target: &str) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a LogRecord>,
    W: Write,
{
    let io_err = |source| ExportError::Io {
        target: target.to_string(),
        source,
    };

    let mut count = 0;
    for record in records {
        writeln!(writer, "{record}").map_err(io_err)?;
        count += 1;
    }
    writer.flush().map_err(io_err)?;
    Ok(count)
}

/// Export records to CSV.
///
/// Writes: timestamp, client_address, method, path, status, size
pub fn export_csv<'a, I, W>(records: I, writer: W, target: &str) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a LogRecord>,
    W: Write,
{
    let csv_err = |source| ExportError::Csv {
        target: target.to_string(),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["timestamp", "client_address", "method", "path", "status", "size"])
        .map_err(csv_err)?;

    let mut count = 0;
    for record in records {
        let request = record.request();
        csv_writer
            .write_record([
                record.timestamp().to_rfc3339().as_str(),
                record.client_address(),
                request.method().as_str(),
                request.path(),
                request.status_code(),
                request.size().to_string().as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|source| ExportError::Io {
        target: target.to_string(),
        source,
    })?;

    Ok(count)
}

/// Export records as a JSON array of objects.
pub fn export_json<'a, I, W>(records: I, writer: W, target: &str) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a LogRecord>,
    W: Write,
{
    let records: Vec<&LogRecord> = records.into_iter().collect();
    to_json(&records, writer).map_err(|source| ExportError::Json {
        target: target.to_string(),
        source,
    })?;
    Ok(records.len())
}

fn to_json<T: Serialize, W: Write>(value: &T, mut writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer).map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)
}
