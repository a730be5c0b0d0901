// logrange - util/constants.rs
//
// Single source of truth for named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logrange";

/// Application identifier used for the config directory.
pub const APP_ID: &str = "logrange";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Access log format
// =============================================================================

/// Line shape of a common/combined access log entry.
///
/// Groups: address, bracketed timestamp, method, path, status, size.
/// Anchored at the line start. The status is exactly three digits; the size
/// is any run of digits (a `-` size, as logged for bodiless responses, does
/// not match).
pub const ACCESS_LINE_PATTERN: &str =
    r#"^((?:\d+\.){3}\d+).*\[(\S+.+)\]\s+"([A-Z]+)\s*(\S+).*"\s+(\d{3})\s+(\d+)"#;

/// chrono format of the bracketed timestamp, e.g. `18/Oct/2020:11:15:03 +0200`.
pub const ACCESS_TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// chrono format used when rendering a record timestamp for display.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

// =============================================================================
// Input
// =============================================================================

/// Input file used when neither the CLI nor config.toml names one.
pub const DEFAULT_INPUT_PATH: &str = "./access_log.txt";

/// Upper bound on the number of files a set of input patterns may expand to.
pub const MAX_INPUT_FILES: usize = 1_000;

// =============================================================================
// Logging
// =============================================================================

/// Default tracing filter when neither RUST_LOG, --debug, nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted values for `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Maximum characters of a skipped line echoed into debug logs.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Config
// =============================================================================

/// Config file name within the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
