// logrange - util/logging.rs
//
// tracing subscriber setup for the CLI. Diagnostics go to stderr; stdout is
// reserved for exported records so output can be piped or redirected.

use super::constants;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: `RUST_LOG`, then `--debug`, then the config
/// file level, then the default level.
pub fn filter_directive(
    rust_log: Option<String>,
    debug_flag: bool,
    config_level: Option<&str>,
) -> String {
    match (rust_log, debug_flag, config_level) {
        (Some(env), _, _) if !env.trim().is_empty() => env,
        (_, true, _) => "debug".to_string(),
        (_, false, Some(level)) => level.to_string(),
        _ => constants::DEFAULT_LOG_LEVEL.to_string(),
    }
}

/// Install the global subscriber. Call once, before any work is logged.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let directive = filter_directive(std::env::var("RUST_LOG").ok(), debug_flag, config_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| {
        eprintln!("Ignoring invalid log filter {directive:?}");
        EnvFilter::new(constants::DEFAULT_LOG_LEVEL)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug_flag)
        .with_file(debug_flag)
        .with_line_number(debug_flag)
        .compact()
        .init();

    tracing::debug!(
        app = constants::APP_NAME,
        version = constants::APP_VERSION,
        filter = %directive,
        "Logging initialised"
    );
}
