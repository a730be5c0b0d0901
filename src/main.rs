// logrange - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. Running the analysis pipeline and reporting failures

use clap::Parser;
use logrange::app::analyse::{self, AnalysisRequest};
use logrange::core::export::ExportFormat;
use logrange::core::filter::parse_bound;
use logrange::platform::{config, fs};
use logrange::util::{self, error::LogRangeError};
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// logrange - access log parser and time range filter.
///
/// Reads common/combined access logs, validates each request, and prints
/// the entries whose timestamp falls within [START, END].
#[derive(Parser, Debug)]
#[command(name = "logrange", version, about)]
struct Cli {
    /// Log files or glob patterns (default: [input] paths from config, else ./access_log.txt).
    inputs: Vec<String>,

    /// Inclusive start, e.g. "18/Oct/2020:10:59:54 +0200" or RFC 3339 (default: earliest entry).
    #[arg(short = 's', long = "start")]
    start: Option<String>,

    /// Inclusive end, same forms as --start (default: latest entry).
    #[arg(short = 'e', long = "end")]
    end: Option<String>,

    /// Output format: text, csv or json.
    #[arg(short = 'f', long = "format")]
    format: Option<String>,

    /// Write output to a file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Path to config.toml (default: platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "logrange starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    match run(cli, app_config) {
        Ok(report) => {
            tracing::info!(
                files = report.files,
                records = report.records,
                selected = report.selected,
                skipped = report.skipped.total(),
                "Done"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(
    cli: Cli,
    app_config: config::AppConfig,
) -> Result<analyse::AnalysisReport, LogRangeError> {
    let patterns = if cli.inputs.is_empty() {
        app_config.input_paths
    } else {
        cli.inputs
    };
    let inputs = fs::expand_inputs(&patterns)?;

    let start = cli.start.as_deref().map(parse_bound).transpose()?;
    let end = cli.end.as_deref().map(parse_bound).transpose()?;

    let format = match cli.format.as_deref() {
        Some(name) => ExportFormat::from_name(name).ok_or_else(|| config::invalid_format(name))?,
        None => app_config.output_format,
    };

    let request = AnalysisRequest {
        inputs,
        start,
        end,
        format,
    };

    // Output is opened only after every input has been read.
    let prepared = analyse::prepare(&request)?;

    match cli.output {
        Some(path) => {
            let target = path.display().to_string();
            let file = std::fs::File::create(&path).map_err(|source| {
                LogRangeError::Export(util::error::ExportError::Io {
                    target: target.clone(),
                    source,
                })
            })?;
            analyse::write_selected(&prepared, request.format, BufWriter::new(file), &target)
        }
        None => analyse::write_selected(&prepared, request.format, io::stdout().lock(), "stdout"),
    }
}
