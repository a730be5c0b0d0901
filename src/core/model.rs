// logrange - core/model.rs
//
// Validated record types for parsed access log entries. Pure data with no
// I/O. Fields are private so that a record can only come into existence
// through the validating constructors.

use crate::core::extract::RawFields;
use crate::util::constants;
use crate::util::error::RecordError;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

// =============================================================================
// HTTP method
// =============================================================================

/// The closed set of HTTP methods accepted in a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Options,
    Connect,
    Patch,
}

impl HttpMethod {
    /// Returns all accepted methods.
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Head,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Trace,
            HttpMethod::Options,
            HttpMethod::Connect,
            HttpMethod::Patch,
        ]
    }

    /// Wire token for the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Looks up a method by its exact (case-sensitive) token.
    pub fn from_token(token: &str) -> Option<HttpMethod> {
        Self::all().iter().copied().find(|m| m.as_str() == token)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// HTTP request
// =============================================================================

/// The request portion of an access log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpRequest {
    method: HttpMethod,
    /// Request target exactly as logged (no normalisation or decoding).
    path: String,
    /// Status code kept as logged text; it is never used arithmetically.
    status_code: String,
    /// Response size in bytes.
    size: u64,
}

impl HttpRequest {
    /// Build a request, rejecting any method outside the accepted set.
    ///
    /// The path is accepted as-is, including empty or relative values.
    pub fn new(
        method: &str,
        path: impl Into<String>,
        status_code: impl Into<String>,
        size: u64,
    ) -> Result<Self, RecordError> {
        let method = HttpMethod::from_token(method).ok_or_else(|| {
            RecordError::MalformedRequest {
                method: method.to_string(),
            }
        })?;
        Ok(Self {
            method,
            path: path.into(),
            status_code: status_code.into(),
            size,
        })
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status_code(&self) -> &str {
        &self.status_code
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Request[method - {}, path - {}, status - {}, size - {}]",
            self.method, self.path, self.status_code, self.size
        )
    }
}

// =============================================================================
// Log record
// =============================================================================

/// One validated access log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// Client address as logged; not validated as a real IP.
    client_address: String,
    timestamp: DateTime<FixedOffset>,
    request: HttpRequest,
}

impl LogRecord {
    /// Assemble a record from already-validated parts.
    pub fn new(
        client_address: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        request: HttpRequest,
    ) -> Self {
        Self {
            client_address: client_address.into(),
            timestamp,
            request,
        }
    }

    /// Build a record from extracted line fields.
    ///
    /// The timestamp is parsed before the method is checked, so a line with
    /// both problems reports `TimestampFormat`. No record is produced on
    /// either failure.
    pub fn from_fields(fields: &RawFields<'_>) -> Result<Self, RecordError> {
        let timestamp = parse_log_timestamp(fields.timestamp)?;
        let request = HttpRequest::new(fields.method, fields.path, fields.status, fields.size)?;
        Ok(Self::new(fields.address, timestamp, request))
    }

    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log: {} {} {}",
            self.client_address,
            self.timestamp.format(constants::DISPLAY_TIMESTAMP_FORMAT),
            self.request
        )
    }
}

/// Parse an access log timestamp such as `18/Oct/2020:11:15:03 +0200`.
pub fn parse_log_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, RecordError> {
    DateTime::parse_from_str(raw, constants::ACCESS_TIMESTAMP_FORMAT).map_err(|_| {
        RecordError::TimestampFormat {
            raw: raw.to_string(),
            format: constants::ACCESS_TIMESTAMP_FORMAT,
        }
    })
}
