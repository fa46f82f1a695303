// crates/mercury-compat-cli/src/main.rs
// ============================================================================
// Module: Mercury Compat CLI Entry Point
// Description: Command-line runner for the Mercury compatibility harness.
// Purpose: Load configuration, run every check and report the outcome.
// Dependencies: clap, mercury-compat-harness, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! `mercury-compat` reads its configuration from the environment, applies
//! command-line overrides, runs the six compatibility checks and exits with
//! status 0 only when every check passed. Text output streams per-check
//! sections as they finish; JSON output prints the report once at the end.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use mercury_compat_harness::ConfigError;
use mercury_compat_harness::ConsoleEventSink;
use mercury_compat_harness::FanoutEventSink;
use mercury_compat_harness::Harness;
use mercury_compat_harness::HarnessConfig;
use mercury_compat_harness::HarnessError;
use mercury_compat_harness::HarnessEventSink;
use mercury_compat_harness::HttpClientFactory;
use mercury_compat_harness::NoopEventSink;
use mercury_compat_harness::StderrEventSink;
use mercury_compat_harness::TestRunReport;
use mercury_compat_harness::report::render_summary;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "mercury-compat", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// API base URL (overrides `MERCURY_API_URL`).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Model requested by the probes (overrides `MERCURY_COMPAT_MODEL`).
    #[arg(long, value_name = "ID")]
    model: Option<String>,
    /// Model the listing check looks for (overrides `MERCURY_COMPAT_EXPECTED_MODEL`).
    #[arg(long, value_name = "ID")]
    expected_model: Option<String>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Also log run events as JSON lines on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    log_json: bool,
}

/// Report output formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Per-check sections and a summary table.
    Text,
    /// The serialized run report.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI errors.
#[derive(Debug, Error)]
enum CliError {
    /// Environment configuration was invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The harness refused to run.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(String),
    /// Writing to an output stream failed.
    #[error("failed to write {stream}: {message}")]
    Output {
        /// Stream label.
        stream: &'static str,
        /// Underlying I/O error.
        message: String,
    },
}

impl CliError {
    /// Wraps a stdout write failure.
    fn stdout(error: &std::io::Error) -> Self {
        Self::Output {
            stream: "stdout",
            message: error.to_string(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration, runs the harness and writes the report.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("mercury-compat {version}"))
            .map_err(|err| CliError::stdout(&err))?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = HarnessConfig::load()?;
    apply_overrides(&mut config, &cli);

    if cli.format == OutputFormat::Text {
        write_banner(&config).map_err(|err| CliError::stdout(&err))?;
    }
    let factory = Arc::new(HttpClientFactory::new(config.client));
    let mut harness =
        Harness::new(factory, config.probes).with_sink(build_sink(cli.format, cli.log_json));
    let report = harness.run().await?;
    write_report(&report, cli.format)?;
    Ok(ExitCode::from(report.exit_code()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies command-line overrides on top of environment configuration.
fn apply_overrides(config: &mut HarnessConfig, cli: &Cli) {
    if let Some(url) = &cli.base_url {
        config.client.base_url.clone_from(url);
    }
    if let Some(model) = &cli.model {
        config.probes.model.clone_from(model);
    }
    if let Some(model) = &cli.expected_model {
        config.probes.expected_model.clone_from(model);
    }
}

/// Chooses where run events go for the selected output mode.
fn build_sink(format: OutputFormat, log_json: bool) -> Arc<dyn HarnessEventSink> {
    let mut sinks: Vec<Arc<dyn HarnessEventSink>> = Vec::new();
    if format == OutputFormat::Text {
        sinks.push(Arc::new(ConsoleEventSink::stdout()));
    }
    if log_json {
        sinks.push(Arc::new(StderrEventSink));
    }
    match sinks.len() {
        0 => Arc::new(NoopEventSink),
        1 => sinks.remove(0),
        _ => Arc::new(FanoutEventSink::new(sinks)),
    }
}

/// Writes the run header for text output.
fn write_banner(config: &HarnessConfig) -> std::io::Result<()> {
    write_stdout_line("Mercury API compatibility test")?;
    write_stdout_line(&format!("endpoint: {}", config.client.base_url))?;
    write_stdout_line(&format!("model: {}", config.probes.model))
}

/// Renders the final report in the selected format.
fn render_report(report: &TestRunReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(render_summary(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|err| CliError::Serialize(err.to_string())),
    }
}

/// Writes the final report to stdout.
fn write_report(report: &TestRunReport, format: OutputFormat) -> CliResult<()> {
    let rendered = render_report(report, format)?;
    write_stdout_line(&rendered).map_err(|err| CliError::stdout(&err))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
