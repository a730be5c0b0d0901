// logrange - platform/config.rs
//
// Config directory resolution and config.toml loading with validation.
// Invalid values produce warnings and fall back to defaults; the
// application still starts.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::ExportFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default location of config.toml for this platform.
///
/// Falls back to the current directory if platform dirs cannot be determined.
pub fn default_config_path() -> PathBuf {
    match ProjectDirs::from("", "", constants::APP_ID) {
        Some(dirs) => dirs.config_dir().join(constants::CONFIG_FILE_NAME),
        None => {
            tracing::warn!("Could not determine platform directories, using current directory");
            PathBuf::from(".").join(constants::CONFIG_FILE_NAME)
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[input]` section.
    pub input: InputSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Log files or glob patterns read when none are given on the command line.
    pub paths: Option<Vec<String>>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "text", "csv" or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from config.toml.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input_paths: Vec<String>,
    pub output_format: ExportFormat,
    /// Logging level string (applied before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_paths: vec![constants::DEFAULT_INPUT_PATH.to_string()],
            output_format: ExportFormat::default(),
            log_level: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// Returns the validated config and a list of non-fatal warnings. A missing
/// file yields defaults and no warnings. An unreadable or unparseable file
/// yields defaults and one warning.
///
/// This runs before logging is initialised, so problems are returned rather
/// than logged; the caller reports them once tracing is up.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(config_path) {
        Ok(raw) => raw,
        Err(e) => {
            warnings.push(format!("{e}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let (config, errors) = validate(raw);
    warnings.extend(errors.iter().map(ToString::to_string));
    (config, warnings)
}

fn read_raw_config(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Error for an output format name that is not text, csv or json.
pub fn invalid_format(name: &str) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: "output.format".to_string(),
        value: name.to_string(),
        expected: "\"text\", \"csv\" or \"json\"".to_string(),
    }
}

/// Validate each field, accumulating every problem.
fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut errors = Vec::new();

    // -- Input: paths --
    if let Some(paths) = raw.input.paths {
        let paths: Vec<String> = paths.into_iter().filter(|p| !p.trim().is_empty()).collect();
        if paths.is_empty() {
            errors.push(ConfigError::ValueOutOfRange {
                field: "input.paths".to_string(),
                value: "[]".to_string(),
                expected: "at least one non-empty path or pattern".to_string(),
            });
        } else {
            config.input_paths = paths;
        }
    }

    // -- Output: format --
    if let Some(ref name) = raw.output.format {
        match ExportFormat::from_name(name) {
            Some(format) => config.output_format = format,
            None => errors.push(invalid_format(name)),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            errors.push(ConfigError::ValueOutOfRange {
                field: "logging.level".to_string(),
                value: level.clone(),
                expected: constants::VALID_LOG_LEVELS.join(", "),
            });
        }
    }

    (config, errors)
}
